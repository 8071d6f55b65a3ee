//! Corruption reports.
//!
//! Reports are capped: a few examples per kind plus a remainder count.

use std::collections::BTreeMap;
use std::fmt::Write;

use planwright_core::domain::{EntityHandle, ShadowValue, SolutionDescriptor, VariableId};
use planwright_core::score::Score;

use crate::constraint_match::{ConstraintMatch, ConstraintMatchKey};

const CONSTRAINT_MATCH_DISPLAY_LIMIT: usize = 8;
const STALE_SHADOW_DISPLAY_LIMIT: usize = 3;

/// Names the director under suspicion in a report.
///
/// A predicted score may come from another director, so the working one is
/// not necessarily the corrupted one.
fn working_label(predicted: bool) -> &'static str {
    if predicted {
        "working"
    } else {
        "corrupted"
    }
}

/// Explains a score corruption by diffing the constraint match multisets of
/// the working and the uncorrupted calculator.
///
/// `None` means the calculator had constraint matching disabled.
pub(crate) fn score_corruption_analysis<Sc: Score>(
    corrupted: Option<&[ConstraintMatch<Sc>]>,
    uncorrupted: Option<&[ConstraintMatch<Sc>]>,
    predicted: bool,
) -> String {
    let (Some(corrupted), Some(uncorrupted)) = (corrupted, uncorrupted) else {
        return format!(
            "Score corruption analysis could not be generated because either corrupted \
             constraintMatchEnabled ({}) or uncorrupted constraintMatchEnabled ({}) is disabled.\n  \
             Check your score constraints manually.",
            corrupted.is_some(),
            uncorrupted.is_some()
        );
    };

    // Positive: in excess in the corrupted matches. Negative: missing.
    let mut cardinality: BTreeMap<ConstraintMatchKey<Sc>, i64> = BTreeMap::new();
    for m in corrupted {
        *cardinality.entry(m.key()).or_default() += 1;
    }
    for m in uncorrupted {
        *cardinality.entry(m.key()).or_default() -= 1;
    }

    let mut excess = Vec::new();
    let mut missing = Vec::new();
    for (key, count) in &cardinality {
        let target = if *count > 0 { &mut excess } else { &mut missing };
        for _ in 0..count.unsigned_abs() {
            target.push(key);
        }
    }

    let label = working_label(predicted);
    let mut analysis = String::from("Score corruption analysis:\n");
    append_matches(&mut analysis, label, &excess, "in excess", " (and should not be)");
    append_matches(&mut analysis, label, &missing, "missing", "");
    if !excess.is_empty() || !missing.is_empty() {
        analysis.push_str("  Check your score constraints.");
    } else if predicted {
        analysis.push_str(
            "  The working scoreDirector is probably not the corrupted one.\n  \
             Maybe the score was predicted from a move whose effects differ from doing it.",
        );
    } else {
        analysis.push_str(
            "  The corrupted scoreDirector has no ConstraintMatch(es) which are in excess or missing.\n  \
             That could be a bug in the score calculator's constraint matches.\n  \
             Check your score constraints manually.",
        );
    }
    analysis
}

fn append_matches<Sc: Score>(
    analysis: &mut String,
    label: &str,
    keys: &[&ConstraintMatchKey<Sc>],
    kind: &str,
    remark: &str,
) {
    if keys.is_empty() {
        let _ = writeln!(
            analysis,
            "  The {} scoreDirector has no ConstraintMatch(es) which are {}.",
            label, kind
        );
        return;
    }
    let _ = writeln!(
        analysis,
        "  The {} scoreDirector has {} ConstraintMatch(es) which are {}{}:",
        label,
        keys.len(),
        kind,
        remark
    );
    for key in keys.iter().take(CONSTRAINT_MATCH_DISPLAY_LIMIT) {
        let _ = writeln!(analysis, "    {}", key);
    }
    if keys.len() > CONSTRAINT_MATCH_DISPLAY_LIMIT {
        let _ = writeln!(analysis, "    ... {} more", keys.len() - CONSTRAINT_MATCH_DISPLAY_LIMIT);
    }
}

/// Shadow variable values of every entity, in global shadow order.
pub(crate) struct ShadowSnapshot {
    values: Vec<(VariableId, EntityHandle, Box<dyn ShadowValue>)>,
}

impl ShadowSnapshot {
    pub(crate) fn take<S>(descriptor: &SolutionDescriptor<S>, solution: &S) -> Self {
        let mut values = Vec::new();
        for &variable in descriptor.shadow_variables_in_global_order() {
            let Some(entity_descriptor) = descriptor.entity_descriptor(variable.descriptor_index)
            else {
                continue;
            };
            let Some(shadow) = descriptor.variable(variable).and_then(|v| v.as_shadow()) else {
                continue;
            };
            for index in 0..entity_descriptor.entity_count(solution) {
                values.push((
                    variable,
                    EntityHandle::new(variable.descriptor_index, index),
                    shadow.value(solution, index),
                ));
            }
        }
        Self { values }
    }

    /// Lists every shadow value that differs in `uncorrupted`, a few per
    /// variable.
    ///
    /// Returns `None` when nothing changed.
    pub(crate) fn violations<S>(
        &self,
        uncorrupted: &ShadowSnapshot,
        descriptor: &SolutionDescriptor<S>,
    ) -> Option<String> {
        let mut per_variable: Vec<(VariableId, Vec<String>)> = Vec::new();
        for ((variable, entity, corrupted), (_, _, uncorrupted)) in
            self.values.iter().zip(&uncorrupted.values)
        {
            if corrupted.eq_value(uncorrupted.as_ref()) {
                continue;
            }
            let line = format!(
                "  The entity ({})'s shadow variable ({})'s corrupted value ({:?}) changed to uncorrupted value ({:?}) \
                 after all variable listeners were triggered without changes to the genuine variables.",
                entity_name(descriptor, *entity),
                variable_name(descriptor, *variable),
                corrupted,
                uncorrupted
            );
            match per_variable.last_mut() {
                Some((last, lines)) if last == variable => lines.push(line),
                _ => per_variable.push((*variable, vec![line])),
            }
        }
        if per_variable.is_empty() {
            return None;
        }

        let mut violations = String::new();
        for (_, lines) in &per_variable {
            for line in lines.iter().take(STALE_SHADOW_DISPLAY_LIMIT) {
                let _ = writeln!(violations, "{}", line);
            }
            if lines.len() > STALE_SHADOW_DISPLAY_LIMIT {
                let _ = writeln!(violations, "  ... {} more", lines.len() - STALE_SHADOW_DISPLAY_LIMIT);
            }
        }
        Some(violations)
    }
}

/// Report of stale shadow variables found after `completed_action`.
pub(crate) fn stale_shadow_report(violations: &str, completed_action: &str) -> String {
    format!(
        "VariableListener corruption after completedAction ({}):\n{}  \
         Maybe one of your VariableListeners does not update all its shadow variables on every \
         source change.\n  Maybe a source of one of your shadow variables is not declared.",
        completed_action, violations
    )
}

/// Shadow variable section of a score corruption report.
pub(crate) fn shadow_variable_analysis(violations: Option<&str>, predicted: bool) -> String {
    let label = working_label(predicted);
    match violations {
        None => format!("Shadow variable corruption in the {} scoreDirector:\n  None", label),
        Some(violations) => format!(
            "Shadow variable corruption in the {} scoreDirector:\n{}  \
             Maybe there is a bug in the VariableListener of those shadow variable(s).",
            label, violations
        ),
    }
}

pub(crate) fn entity_name<S>(descriptor: &SolutionDescriptor<S>, entity: EntityHandle) -> String {
    match descriptor.entity_descriptor(entity.descriptor_index) {
        Some(d) => format!("{}[{}]", d.type_name, entity.index),
        None => entity.to_string(),
    }
}

pub(crate) fn variable_name<S>(descriptor: &SolutionDescriptor<S>, variable: VariableId) -> String {
    let entity = descriptor.entity_descriptor(variable.descriptor_index);
    match (entity, descriptor.variable(variable)) {
        (Some(e), Some(v)) => format!("{}.{}", e.type_name, v.name),
        _ => variable.to_string(),
    }
}

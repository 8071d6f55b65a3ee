//! Declarative macros for reducing score type boilerplate.
//!
//! These macros generate the repetitive trait implementations that all
//! field-based score types share: ordering and arithmetic that carry the
//! init score alongside the level fields.

/// Generates `PartialOrd`, `Ord`, `Add`, `Sub`, and `Neg` for a field-based score type.
///
/// The init score is compared first, then each level in declaration order.
/// The constructor must accept the init score followed by the fields in the
/// order they are listed.
///
/// # Usage
/// ```ignore
/// impl_score_ops!(HardSoftScore { hard, soft } => of_uninitialized);
/// ```
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.init_score
                    .cmp(&other.init_score)
                    $(.then_with(|| self.$field.cmp(&other.$field)))+
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor(
                    self.init_score + other.init_score,
                    $(self.$field + other.$field),+
                )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor(
                    self.init_score - other.init_score,
                    $(self.$field - other.$field),+
                )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor(-self.init_score, $(-self.$field),+)
            }
        }
    };
}

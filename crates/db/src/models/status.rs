//! Status helper enums mapping to SMALLSERIAL lookup tables.
//!
//! Each enum variant's discriminant matches the seed data (1-based) in the
//! corresponding `*_statuses` table, so in-memory storage can expand a
//! status id without a round-trip.

use serde::Serialize;
use sqlx::FromRow;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// An expanded row from a `*_statuses` lookup table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StatusInfo {
    pub id: StatusId,
    pub name: String,
    pub label: String,
}

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => ($slug:expr, $label:expr) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant in seed order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Machine name stored in the lookup table's `name` column.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $slug ),+
                }
            }

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Resolve a database status ID back to its variant.
            pub fn from_id(id: StatusId) -> Option<Self> {
                Self::ALL.iter().copied().find(|s| s.id() == id)
            }

            /// The lookup row this variant corresponds to.
            pub fn info(self) -> StatusInfo {
                StatusInfo {
                    id: self.id(),
                    name: self.name().to_string(),
                    label: self.label().to_string(),
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Enrollment lifecycle status. Withdrawn enrollments are deleted rather
    /// than given a status.
    EnrollmentStatus {
        Pending = 1 => ("pending", "Pending"),
        Active = 2 => ("active", "Active"),
        Suspended = 3 => ("suspended", "Suspended"),
        Completed = 4 => ("completed", "Completed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_order() {
        assert_eq!(EnrollmentStatus::Pending.id(), 1);
        assert_eq!(EnrollmentStatus::Active.id(), 2);
        assert_eq!(EnrollmentStatus::Suspended.id(), 3);
        assert_eq!(EnrollmentStatus::Completed.id(), 4);
    }

    #[test]
    fn from_id_resolves_known_and_rejects_unknown() {
        assert_eq!(EnrollmentStatus::from_id(2), Some(EnrollmentStatus::Active));
        assert_eq!(EnrollmentStatus::from_id(0), None);
        assert_eq!(EnrollmentStatus::from_id(5), None);
    }

    #[test]
    fn info_expands_name_and_label() {
        let info = EnrollmentStatus::Suspended.info();
        assert_eq!(info.id, 3);
        assert_eq!(info.name, "suspended");
        assert_eq!(info.label, "Suspended");
    }
}

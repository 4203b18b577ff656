//! Field-level rules that turn a raw source record into catalog shape.
//!
//! Each rule is a standalone function so it can be tested in isolation; [`normalize`]
//! only stitches them together.

use crate::catalog::{NewSpecialist, OpeningHours};
use crate::source::RawSourceRecord;
use crate::wkt::encode_point;
use serde::Serialize;

/// Country appended to synthesized addresses. The feed only covers one country.
pub const COUNTRY: &str = "Slovenská republika";

/// Token the feed uses for "yes" in its three-valued flags.
pub const AFFIRMATIVE: &str = "áno";

/// Role clauses appended to each staff member's name in the roster field.
pub const STAFF_ROLE_SUFFIXES: [&str; 10] = [
    " ako lekár",
    " ako sestra",
    " ako iný zdravotnícky pracovník - psychológ",
    " ako zubný lekár",
    " ako iný zdravotnícky pracovník - logopéd",
    " ako iný zdravotnícky pracovník - liečebný pedagóg",
    " ako dentálna hygienička",
    " ako zdravotnícky laborant",
    " ako pôrodná asistentka",
    " ako rádiologický technik",
];

/// Insurer affiliations published for a specialist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsurerAffiliations {
    /// Contract with Union.
    pub union: bool,
    /// Contract with VšZP.
    pub vszp: bool,
    /// Contract with Dôvera.
    pub dovera: bool,
}

/// Output of [`normalize`]: the insert payload plus derived fields the catalog does not store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Row ready for [`crate::catalog::CatalogStore::insert_specialist`].
    pub specialist: NewSpecialist,
    /// Staff roster with role clauses removed.
    pub staff: String,
    /// Insurer affiliation flags.
    pub insurers: InsurerAffiliations,
}

/// Map a raw record onto the catalog model, given the id of its resolved specialty.
pub fn normalize(raw: &RawSourceRecord, specialty_id: i32) -> NormalizedRecord {
    NormalizedRecord {
        specialist: NewSpecialist {
            name: raw.name.clone(),
            specialty_id,
            location: location(raw),
            address: address(raw),
            telephone: telephone(raw),
            email: raw.email.clone(),
            hours: opening_hours(raw),
        },
        staff: staff_names(&raw.staff),
        insurers: insurers(raw),
    }
}

/// `POINT(<lon> <lat>)` for the record's coordinates.
pub fn location(raw: &RawSourceRecord) -> String {
    encode_point(raw.longitude, raw.latitude)
}

/// The published address line, or one assembled from its components when blank.
pub fn address(raw: &RawSourceRecord) -> String {
    if !raw.address_line.is_empty() {
        return raw.address_line.clone();
    }
    format!(
        "{} {}, {} {}, {COUNTRY}",
        raw.street_name, raw.building_number, raw.postal_code, raw.municipality
    )
}

/// Landline and mobile joined as `"<phone>, <mobile>"`.
///
/// Empty numbers still produce the separator, so consumers can rely on the shape.
pub fn telephone(raw: &RawSourceRecord) -> String {
    format!("{}, {}", raw.phone, raw.cellphone)
}

/// Strip every known role clause from the roster, leaving a comma-joined name list.
pub fn staff_names(staff: &str) -> String {
    STAFF_ROLE_SUFFIXES
        .iter()
        .fold(staff.to_string(), |roster, suffix| roster.replace(suffix, ""))
}

/// Exact match against [`AFFIRMATIVE`]; anything else, including empty, is `false`.
pub fn is_affirmative(flag: &str) -> bool {
    flag == AFFIRMATIVE
}

/// Insurer flags decoded from the three yes/no fields.
pub fn insurers(raw: &RawSourceRecord) -> InsurerAffiliations {
    InsurerAffiliations {
        union: is_affirmative(&raw.union),
        vszp: is_affirmative(&raw.vszp),
        dovera: is_affirmative(&raw.dovera),
    }
}

/// Weekday hours copied verbatim.
pub fn opening_hours(raw: &RawSourceRecord) -> OpeningHours {
    OpeningHours {
        monday: raw.monday_hours.clone(),
        tuesday: raw.tuesday_hours.clone(),
        wednesday: raw.wednesday_hours.clone(),
        thursday: raw.thursday_hours.clone(),
        friday: raw.friday_hours.clone(),
        saturday: raw.saturday_hours.clone(),
        sunday: raw.sunday_hours.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RawSourceRecord {
        RawSourceRecord {
            name: "Dr. John Doe".into(),
            specialization: "ortoped".into(),
            latitude: 48.43,
            longitude: -71.06,
            ..Default::default()
        }
    }

    #[test]
    fn location_is_longitude_first() {
        assert_eq!(location(&record()), "POINT(-71.06 48.43)");
    }

    #[test]
    fn address_prefers_published_line() {
        let raw = RawSourceRecord {
            address_line: "Mierová 5, 82105 Bratislava".into(),
            street_name: "Ignored".into(),
            ..record()
        };
        assert_eq!(address(&raw), "Mierová 5, 82105 Bratislava");
    }

    #[test]
    fn address_is_synthesized_when_line_is_empty() {
        let raw = RawSourceRecord {
            street_name: "Main".into(),
            building_number: "9".into(),
            postal_code: "07101".into(),
            municipality: "Town".into(),
            ..record()
        };
        assert_eq!(address(&raw), "Main 9, 07101 Town, Slovenská republika");
    }

    #[test]
    fn telephone_keeps_separator_for_empty_segments() {
        let raw = RawSourceRecord {
            phone: "02/444".into(),
            cellphone: "0905 000 111".into(),
            ..record()
        };
        assert_eq!(telephone(&raw), "02/444, 0905 000 111");
        assert_eq!(telephone(&record()), ", ");
    }

    #[test]
    fn staff_roster_drops_role_clauses() {
        assert_eq!(staff_names("A ako lekár, B ako sestra"), "A, B");
        assert_eq!(staff_names(""), "");
        assert_eq!(staff_names("Ján Novák"), "Ján Novák");
    }

    #[test]
    fn every_role_clause_is_removed() {
        for suffix in STAFF_ROLE_SUFFIXES {
            let roster = format!("Mgr. Eva Malá{suffix}, MUDr. Peter Veľký{suffix}");
            assert_eq!(
                staff_names(&roster),
                "Mgr. Eva Malá, MUDr. Peter Veľký",
                "suffix {suffix:?}"
            );
        }
    }

    #[test]
    fn affirmative_flag_is_an_exact_match() {
        assert!(is_affirmative("áno"));
        assert!(!is_affirmative("Áno"));
        assert!(!is_affirmative("ano"));
        assert!(!is_affirmative("nie"));
        assert!(!is_affirmative(""));

        let raw = RawSourceRecord {
            union: "áno".into(),
            vszp: "nie".into(),
            ..record()
        };
        assert_eq!(
            insurers(&raw),
            InsurerAffiliations {
                union: true,
                vszp: false,
                dovera: false,
            }
        );
    }

    #[test]
    fn normalize_assembles_every_rule() {
        let raw = RawSourceRecord {
            email: "ortopedia@example.sk".into(),
            phone: "02/444".into(),
            staff: "A ako lekár".into(),
            monday_hours: "7:00 - 12:00".into(),
            friday_hours: "7:00 - 11:00".into(),
            dovera: "áno".into(),
            ..record()
        };

        let normalized = normalize(&raw, 12);
        let specialist = &normalized.specialist;
        assert_eq!(specialist.name, "Dr. John Doe");
        assert_eq!(specialist.specialty_id, 12);
        assert_eq!(specialist.location, "POINT(-71.06 48.43)");
        assert_eq!(specialist.address, " ,  , Slovenská republika");
        assert_eq!(specialist.telephone, "02/444, ");
        assert_eq!(specialist.email, "ortopedia@example.sk");
        assert_eq!(specialist.hours.monday, "7:00 - 12:00");
        assert_eq!(specialist.hours.friday, "7:00 - 11:00");
        assert_eq!(specialist.hours.sunday, "");
        assert_eq!(normalized.staff, "A");
        assert!(normalized.insurers.dovera);
        assert!(!normalized.insurers.union);
    }
}

use super::{Gender, IdentityRecord, transliterate};
use sha2::{Digest, Sha256};

const MALE_FIRST_NAMES: [&str; 10] = [
    "Иван", "Петр", "Сергей", "Александр", "Дмитрий", "Андрей", "Михаил", "Алексей", "Николай",
    "Владимир",
];
const MALE_LAST_NAMES: [&str; 10] = [
    "Иванов", "Петров", "Сидоров", "Смирнов", "Кузнецов", "Попов", "Васильев", "Павлов",
    "Соколов", "Михайлов",
];
const MALE_MIDDLE_NAMES: [&str; 10] = [
    "Иванович",
    "Петрович",
    "Сергеевич",
    "Александрович",
    "Дмитриевич",
    "Андреевич",
    "Михайлович",
    "Алексеевич",
    "Николаевич",
    "Владимирович",
];

const FEMALE_FIRST_NAMES: [&str; 10] = [
    "Мария", "Анна", "Елена", "Ольга", "Татьяна", "Наталья", "Ирина", "Светлана", "Екатерина",
    "Юлия",
];
const FEMALE_LAST_NAMES: [&str; 10] = [
    "Иванова", "Петрова", "Сидорова", "Смирнова", "Кузнецова", "Попова", "Васильева", "Павлова",
    "Соколова", "Михайлова",
];
const FEMALE_MIDDLE_NAMES: [&str; 10] = [
    "Ивановна",
    "Петровна",
    "Сергеевна",
    "Александровна",
    "Дмитриевна",
    "Андреевна",
    "Михайловна",
    "Алексеевна",
    "Николаевна",
    "Владимировна",
];

const OID_BASE: u64 = 1_000_000_000;
const OID_RANGE: u64 = 1_000_000_000;
const SNILS_MODULUS: u64 = 100_000_000_000;
const INN_MODULUS: u64 = 1_000_000_000_000;

struct NamePool {
    first: &'static [&'static str; 10],
    last: &'static [&'static str; 10],
    middle: &'static [&'static str; 10],
}

impl Gender {
    fn name_pool(self) -> NamePool {
        match self {
            Gender::Male => NamePool {
                first: &MALE_FIRST_NAMES,
                last: &MALE_LAST_NAMES,
                middle: &MALE_MIDDLE_NAMES,
            },
            Gender::Female => NamePool {
                first: &FEMALE_FIRST_NAMES,
                last: &FEMALE_LAST_NAMES,
                middle: &FEMALE_MIDDLE_NAMES,
            },
        }
    }
}

fn pick(list: &'static [&'static str; 10], selector: u8) -> &'static str {
    list[selector as usize % list.len()]
}

/// Parses a digest hex slice as base 16. Slices are at most 12 characters, so they fit.
fn hex_number(digest_hex: &str) -> u64 {
    u64::from_str_radix(digest_hex, 16).unwrap_or(0)
}

/// Derives a person record from `subject_id`.
///
/// Pure: the output depends only on the SHA-256 digest of the identifier.
pub fn derive_identity(subject_id: &str) -> IdentityRecord {
    let digest = Sha256::digest(subject_id.as_bytes());
    let digest_hex = hex::encode(digest.as_slice());

    // Gender picks the name lists that bytes 0..=2 index into.
    let gender = if digest[6] % 2 == 0 {
        Gender::Female
    } else {
        Gender::Male
    };
    let pool = gender.name_pool();
    let first_name = pick(pool.first, digest[0]);
    let last_name = pick(pool.last, digest[1]);
    let middle_name = pick(pool.middle, digest[2]);

    let year = 1970 + u32::from(digest[3]) % 31;
    let month = 1 + u32::from(digest[4]) % 12;
    // Capped at 28 so every month is valid.
    let day = 1 + u32::from(digest[5]) % 28;

    let oid = OID_BASE + hex_number(&digest_hex[0..10]) % OID_RANGE;
    let snils = hex_number(&digest_hex[10..21]) % SNILS_MODULUS;
    let inn = hex_number(&digest_hex[21..33]) % INN_MODULUS;

    let email = format!(
        "{}.{}.{}@example.com",
        transliterate(first_name),
        transliterate(last_name),
        &digest_hex[33..40]
    )
    .to_lowercase();

    IdentityRecord {
        oid: oid.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        middle_name: middle_name.to_string(),
        birth_date: format!("{day:02}.{month:02}.{year}"),
        gender,
        snils: format!("{snils:011}"),
        inn: format!("{inn:012}"),
        email,
        mobile: subject_id.to_string(),
        trusted: digest[7] % 2 == 0,
        verified: digest[8] % 3 != 0,
        citizenship: "RUS".to_string(),
        status: "REGISTERED".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn golden_female_record() {
        let r = derive_identity("79990000001");
        assert_eq!(r.oid, "1220772984");
        assert_eq!(r.first_name, "Анна");
        assert_eq!(r.last_name, "Петрова");
        assert_eq!(r.middle_name, "Михайловна");
        assert_eq!(r.birth_date, "07.01.1994");
        assert_eq!(r.gender, Gender::Female);
        assert_eq!(r.snils, "82788543668");
        assert_eq!(r.inn, "604487423284");
        assert_eq!(r.email, "anna.petrova.c71007c@example.com");
        assert_eq!(r.mobile, "79990000001");
        assert!(!r.trusted);
        assert!(!r.verified);
        assert_eq!(r.citizenship, "RUS");
        assert_eq!(r.status, "REGISTERED");
    }

    #[test]
    fn golden_male_record() {
        let r = derive_identity("79644223811");
        assert_eq!(r.oid, "1588744988");
        assert_eq!(r.first_name, "Владимир");
        assert_eq!(r.last_name, "Михайлов");
        assert_eq!(r.middle_name, "Владимирович");
        assert_eq!(r.birth_date, "01.05.1997");
        assert_eq!(r.gender, Gender::Male);
        assert_eq!(r.snils, "76568742201");
        assert_eq!(r.inn, "927075959103");
        assert_eq!(r.email, "vladimir.mihaylov.4c7a9d7@example.com");
        assert!(r.trusted);
        assert!(r.verified);
    }

    #[test]
    fn keeps_leading_zeros_in_snils() {
        let r = derive_identity("79161234567");
        assert_eq!(r.snils, "05845415127");
        assert_eq!(r.snils.len(), 11);
    }

    #[test]
    fn empty_subject_still_derives() {
        let r = derive_identity("");
        assert_eq!(r.oid, "1923228312");
        assert_eq!(r.first_name, "Светлана");
        assert_eq!(r.mobile, "");
    }

    #[test]
    fn deterministic() {
        for phone in ["79990000001", "+7 (999) 123-45-67", "not a phone", "ёжик"] {
            assert_eq!(derive_identity(phone), derive_identity(phone));
        }
    }

    #[test]
    fn field_ranges_hold_across_corpus() {
        for n in 0..500u32 {
            let r = derive_identity(&format!("7999{n:07}"));
            let parts: Vec<u32> = r.birth_date.split('.').map(|p| p.parse().unwrap()).collect();
            assert!((1..=28).contains(&parts[0]), "{}", r.birth_date);
            assert!((1..=12).contains(&parts[1]), "{}", r.birth_date);
            assert!((1970..=2000).contains(&parts[2]), "{}", r.birth_date);

            let oid: u64 = r.oid.parse().unwrap();
            assert!((OID_BASE..OID_BASE + OID_RANGE).contains(&oid));
            assert_eq!(r.snils.len(), 11);
            assert_eq!(r.inn.len(), 12);
            assert!(r.email.is_ascii());
            assert!(r.email.ends_with("@example.com"));

            let pool = r.gender.name_pool();
            assert!(pool.first.contains(&r.first_name.as_str()));
            assert!(pool.last.contains(&r.last_name.as_str()));
            assert!(pool.middle.contains(&r.middle_name.as_str()));
        }
    }

    #[test]
    fn distinct_subjects_get_distinct_records() {
        let records: HashSet<String> = (0..1000u32)
            .map(|n| {
                let r = derive_identity(&format!("7916{n:07}"));
                format!("{}|{}|{}|{}", r.oid, r.snils, r.inn, r.email)
            })
            .collect();
        assert_eq!(records.len(), 1000);
    }
}

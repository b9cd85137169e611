use rand::Rng;

pub const MALE_FIRST_NAMES: &[&str] = &[
    "Oliver", "George", "Harry", "Jack", "Thomas", "James", "William", "Daniel", "Samuel",
    "Joseph",
];

pub const FEMALE_FIRST_NAMES: &[&str] = &[
    "Olivia", "Amelia", "Isla", "Ava", "Emily", "Sophie", "Grace", "Lily", "Freya", "Charlotte",
];

pub const NEUTRAL_FIRST_NAMES: &[&str] = &["Alex", "Charlie", "Jordan", "Riley", "Morgan", "Sam"];

pub const LAST_NAMES: &[&str] = &[
    "SMITH", "JONES", "TAYLOR", "BROWN", "WILLIAMS", "WILSON", "JOHNSON", "DAVIES", "PATEL",
    "WRIGHT", "EVANS", "THOMAS", "ROBERTS", "WALKER", "KHAN", "HUGHES",
];

pub const POSTCODES: &[&str] = &[
    "LS1 4AP", "M1 1AE", "B2 4QA", "NE1 7RU", "BS1 5TR", "SW1A 1AA", "EH1 1YZ", "CF10 1EP",
];

pub const PHONES: &[&str] = &[
    "01632 960123",
    "(0113) 496 0000",
    "+44 20 7946 0958",
    "0161-496-0754 x204",
    "07700 900461",
    "028 9018 0123",
];

pub const WARDS: &[&str] = &["CARDIO", "A&E", "ICU", "GEN_MED"];

pub const PATIENT_CLASSES: &[&str] = &["I", "E", "O"];

/// `(allergy type, allergen code^display^system)`
pub const ALLERGENS: &[(&str, &str)] = &[
    ("DA", "Z88.0^PENICILLIN^CD"),
    ("FA", "Z91.01^PEANUTS^CD"),
    ("MA", "Y45.1^ASPIRIN^CD"),
    ("EA", "Z91.04^LATEX^CD"),
];

pub const SEVERITIES: &[&str] = &["SV", "MO", "MI"];

pub const REACTIONS: &[&str] = &["Hives", "Anaphylaxis", "Wheezing", "Nausea"];

/// Uniform pick from a non-empty pool.
pub fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, pool: &[T]) -> T {
    pool[rng.gen_range(0..pool.len())]
}

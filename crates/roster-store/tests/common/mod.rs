use chrono::NaiveDateTime;
use roster_core::model::date;
use roster_core::Student;
use roster_store::{EnrolledDatePolicy, Engine, StoreConfig};

/// Fixed enrollment timestamp used by every test engine
#[allow(dead_code)]
pub fn enrolled_at() -> NaiveDateTime {
    date(2024, 9, 2).unwrap()
}

/// In-memory engine with the students table created
#[allow(dead_code)]
pub fn engine() -> Engine {
    let config =
        StoreConfig::default().with_enrolled_date(EnrolledDatePolicy::Fixed(enrolled_at()));
    let mut engine = Engine::open(config).unwrap();
    engine.create_all().unwrap();
    engine
}

#[allow(dead_code)]
pub fn einstein() -> Student {
    Student::new(
        "Albert Einstein",
        "albert.einstein@zurich.edu",
        6,
        date(1879, 3, 14).unwrap(),
    )
}

#[allow(dead_code)]
pub fn turing() -> Student {
    Student::new(
        "Alan Turing",
        "alan.turing@sherborne.edu",
        11,
        date(1912, 6, 23).unwrap(),
    )
}

/// A student with a generated birthday; only name, email and grade matter
#[allow(dead_code)]
pub fn student(name: &str, email: &str, grade: i64) -> Student {
    Student::new(name, email, grade, date(2010, 1, 1).unwrap())
}

//! Scripted demonstration
//!
//! Seeds two students through the bulk path, then walks through querying,
//! sorting, filtering, aggregation, both update styles and both delete
//! styles, printing one line per step.

use std::fmt::Display;
use std::io::Write;

use roster_core::model::date;
use roster_core::{Aggregate, Column, Query, Student};
use roster_store::{Engine, StoreConfig};

/// Run every step, writing results to `out`
pub fn execute(out: &mut impl Write, config: StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open(config)?;
    engine.create_all()?;
    let mut session = engine.session();

    let albert_einstein = Student::new(
        "Albert Einstein",
        "albert.einstein@zurich.edu",
        6,
        date(1879, 3, 14)?,
    );
    let alan_turing = Student::new(
        "Alan Turing",
        "alan.turing@sherborne.edu",
        11,
        date(1912, 6, 23)?,
    );

    // Bulk path: the values above never receive ids
    session.bulk_save_objects(&[albert_einstein, alan_turing]);
    session.commit()?;

    let students = session.all(&Query::students())?;
    writeln!(out, "{}", list(&students))?;

    let names = session.rows(&Query::columns([Column::Name]))?;
    writeln!(out, "{}", list(&names))?;

    let by_name = session.rows(&Query::columns([Column::Name]).order_by(Column::Name.asc()))?;
    writeln!(out, "{}", list(&by_name))?;

    let by_grade_desc = session
        .rows(&Query::columns([Column::Name, Column::Grade]).order_by(Column::Grade.desc()))?;
    writeln!(out, "{}", list(&by_grade_desc))?;

    let top_student =
        Query::columns([Column::Name, Column::Birthday]).order_by(Column::Grade.desc());
    let limited = session.rows(&top_student.clone().limit(1))?;
    writeln!(out, "{}", list(&limited))?;

    let first = session.first_row(&top_student)?;
    writeln!(out, "{}", optional(first))?;

    let count = session.first_row(&Query::aggregate(Aggregate::Count(Column::Id)))?;
    writeln!(out, "{}", optional(count))?;

    let alans = Query::students()
        .filter(Column::Name.like("%Alan%"))
        .filter(Column::Grade.is(11));
    for record in session.all(&alans)? {
        writeln!(out, "{}", record.name)?;
    }

    let names_and_grades = Query::columns([Column::Name, Column::Grade]);

    // Load, mutate in memory, write back on commit
    for key in session.load(&Query::students())? {
        session.object_mut(key)?.grade += 1;
    }
    session.commit()?;
    writeln!(out, "{}", list(&session.rows(&names_and_grades)?))?;

    // One UPDATE evaluated by storage; grade 12 is the ceiling.
    // Unfiltered +2 across both styles: roster-store test_two_increments_add_two
    session.update(
        &Query::students().filter(Column::Grade.less_than(12)),
        &[Column::Grade.set_expr(Column::Grade.plus(1))],
    )?;
    session.commit()?;
    writeln!(out, "{}", list(&session.rows(&names_and_grades)?))?;

    let einstein = Query::students().filter(Column::Name.is("Albert Einstein"));

    if let Some(key) = session.load_first(&einstein)? {
        session.delete(key)?;
    }
    session.commit()?;
    writeln!(out, "{}", optional(session.first(&einstein)?))?;

    session.delete_where(&einstein)?;
    session.commit()?;
    writeln!(out, "{}", optional(session.first(&einstein)?))?;

    Ok(())
}

/// `[a, b, c]`
fn list<T: Display>(items: &[T]) -> String {
    let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

fn optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> Vec<String> {
        let mut out = Vec::new();
        execute(&mut out, StoreConfig::default()).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_demo_prints_every_step() {
        let lines = run();
        assert_eq!(lines.len(), 12);
        assert_eq!(
            lines[0],
            "[Student 1: Albert Einstein, Grade 6, Student 2: Alan Turing, Grade 11]"
        );
        assert_eq!(lines[2], "[('Alan Turing',), ('Albert Einstein',)]");
        assert_eq!(lines[3], "[('Alan Turing', 11), ('Albert Einstein', 6)]");
        assert_eq!(lines[4], "[('Alan Turing', 1912-06-23 00:00:00)]");
        assert_eq!(lines[5], "('Alan Turing', 1912-06-23 00:00:00)");
        assert_eq!(lines[6], "(2,)");
        assert_eq!(lines[7], "Alan Turing");
        assert_eq!(lines[8], "[('Albert Einstein', 7), ('Alan Turing', 12)]");
        assert_eq!(lines[9], "[('Albert Einstein', 8), ('Alan Turing', 12)]");
        assert_eq!(lines[10], "None");
        assert_eq!(lines[11], "None");
    }

    #[test]
    fn test_list_and_optional_rendering() {
        assert_eq!(list::<i64>(&[]), "[]");
        assert_eq!(list(&[1, 2]), "[1, 2]");
        assert_eq!(optional::<i64>(None), "None");
        assert_eq!(optional(Some("x")), "x");
    }
}

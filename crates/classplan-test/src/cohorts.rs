//! Roster fixtures with known shapes.

use classplan_core::{
    Gender, LanguageId, LanguageRanking, Roster, ScienceId, ScienceRanking, StudentId,
    StudentRecord,
};

/// Language rankings (by rank, most preferred first) cycled through by the
/// fixture rosters. None ranks language 4 first, so the forced-language
/// rule stays quiet unless a fixture asks for it.
const LANGUAGE_TABLE: [[u8; 5]; 4] = [
    [1, 2, 3, 4, 5],
    [2, 3, 1, 5, 4],
    [3, 1, 2, 4, 5],
    [1, 3, 2, 5, 4],
];

/// Science rankings cycled through by the fixture rosters. Three of four
/// put subjects 1 and 2 in front, so `{1, 2}` is the best-match pair of
/// every roster built from this table.
const SCIENCE_TABLE: [[u8; 3]; 4] = [
    [1, 2, 3],
    [2, 1, 3],
    [1, 2, 3],
    [3, 1, 2],
];

/// Builds one record from by-rank preference lists.
pub fn student(
    id: u32,
    gender: Gender,
    languages: [u8; 5],
    sciences: [u8; 3],
    schoolmate: Option<u32>,
) -> StudentRecord {
    StudentRecord {
        id: StudentId(id),
        gender,
        languages: LanguageRanking::new(languages.map(LanguageId))
            .expect("fixture rankings are permutations"),
        sciences: ScienceRanking::new(sciences.map(ScienceId))
            .expect("fixture rankings are permutations"),
        schoolmate: schoolmate.map(StudentId),
        test_score: 50.0 + id as f64,
    }
}

/// `n` students, all female, no schoolmates, preferences cycled from the
/// fixture tables.
pub fn plain_roster(n: u32) -> Roster {
    let records = (1..=n)
        .map(|id| {
            let row = (id - 1) as usize % 4;
            student(
                id,
                Gender::Female,
                LANGUAGE_TABLE[row],
                SCIENCE_TABLE[row],
                None,
            )
        })
        .collect();
    Roster::new(records).expect("fixture roster is valid")
}

/// Six students with one directional schoolmate link (1 → 2). Every
/// student ranks sciences `[1, 2, 3]`, so the best-match pair is `{1, 2}`
/// with count six.
pub fn paired_roster() -> Roster {
    let records = (1..=6)
        .map(|id| {
            let langs = LANGUAGE_TABLE[(id - 1) as usize % 3];
            student(
                id,
                Gender::Female,
                langs,
                [1, 2, 3],
                (id == 1).then_some(2),
            )
        })
        .collect();
    Roster::new(records).expect("fixture roster is valid")
}

/// Two students linked as schoolmates (1 → 2). Infeasible under any
/// configuration whose class capacity is one.
pub fn tiny_pair_roster() -> Roster {
    let records = vec![
        student(1, Gender::Female, LANGUAGE_TABLE[0], [1, 2, 3], Some(2)),
        student(2, Gender::Female, LANGUAGE_TABLE[1], [2, 1, 3], None),
    ];
    Roster::new(records).expect("fixture roster is valid")
}

/// Three students where exactly student 2 ranks language 4 first.
pub fn forced_language_roster() -> Roster {
    let records = vec![
        student(1, Gender::Female, [1, 2, 3, 4, 5], [1, 2, 3], None),
        student(2, Gender::Female, [4, 1, 2, 3, 5], [2, 1, 3], None),
        student(3, Gender::Female, [2, 1, 3, 5, 4], [1, 3, 2], None),
    ];
    Roster::new(records).expect("fixture roster is valid")
}

/// A county of the governed jurisdiction.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct CountyReference {
    /// The composite division string used in the assignment tables.
    pub division: &'static str,
    pub county: &'static str,
    pub code: &'static str,
    pub branch: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn county(
    division: &'static str,
    county: &'static str,
    code: &'static str,
    branch: &'static str,
    latitude: f64,
    longitude: f64,
) -> CountyReference {
    CountyReference {
        division,
        county,
        code,
        branch,
        latitude,
        longitude,
    }
}

/// The counties designated for the East Tennessee operations, in division order.
pub static COUNTIES: [CountyReference; 13] = [
    county("10 - Carter", "Carter", "10", "II", 36.2927, -82.1274),
    county("13 - Claiborne", "Claiborne", "13", "I", 36.4858, -83.6604),
    county("15 - Cocke", "Cocke", "15", "I", 35.9255, -83.1212),
    county("29 - Grainger", "Grainger", "29", "I", 36.2763, -83.5096),
    county("30 - Greene", "Greene", "30", "I", 36.1753, -82.8458),
    county("32 - Hamblen", "Hamblen", "32", "I", 36.2184, -83.2662),
    county("37 - Hawkins", "Hawkins", "37", "I", 36.4412, -82.9447),
    county("45 - Jefferson", "Jefferson", "45", "I", 36.0510, -83.4463),
    county("46 - Johnson", "Johnson", "46", "II", 36.4550, -81.8517),
    county("78 - Sevier", "Sevier", "78", "I", 35.7847, -83.5240),
    county("82 - Sullivan", "Sullivan", "82", "II", 36.5129, -82.3044),
    county("86 - Unicoi", "Unicoi", "86", "II", 36.1103, -82.4373),
    county("90 - Washington", "Washington", "90", "II", 36.2933, -82.4974),
];

const BRANCH_I_DIVISIONS: [&str; 10] = ["47", "78", "45", "15", "30", "32", "37", "29", "34", "13"];
const BRANCH_II_DIVISIONS: [&str; 5] = ["86", "90", "10", "46", "82"];

/// Finds a county by its composite division string.
pub fn lookup_county(division: &str) -> Option<&'static CountyReference> {
    COUNTIES.iter().find(|c| c.division == division)
}

/// The composite division strings of all the reference counties.
pub fn all_divisions() -> Vec<String> {
    COUNTIES.iter().map(|c| c.division.to_string()).collect()
}

/// The branch of a two-character division code, if the division belongs to one.
pub fn branch_for_division(code: &str) -> Option<&'static str> {
    if BRANCH_I_DIVISIONS.contains(&code) {
        Some("I")
    } else if BRANCH_II_DIVISIONS.contains(&code) {
        Some("II")
    } else {
        None
    }
}

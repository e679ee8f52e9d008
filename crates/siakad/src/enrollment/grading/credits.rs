/// Lower GPA bound (inclusive) and the credit load it unlocks, highest first.
const CREDIT_BANDS: [(f64, u32); 3] = [(3.00, 24), (2.50, 21), (2.00, 18)];

pub const MIN_CREDIT_LOAD: u32 = 15;
pub const MAX_CREDIT_LOAD: u32 = 24;

pub(super) fn ceiling_for(gpa: f64) -> u32 {
    CREDIT_BANDS
        .iter()
        .find(|(floor, _)| gpa >= *floor)
        .map(|(_, credits)| *credits)
        .unwrap_or(MIN_CREDIT_LOAD)
}

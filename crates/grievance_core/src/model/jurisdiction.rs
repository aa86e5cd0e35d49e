//! Known jurisdictions offered as `state` choices on the submission form.
//!
//! Validation accepts any non-empty `state`; this list only feeds form
//! options.

pub const KNOWN_STATES: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Andaman and Nicobar Islands",
    "Chandigarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Jammu and Kashmir",
    "Ladakh",
    "Lakshadweep",
    "Puducherry",
];

/// Returns whether `state` is one of the listed jurisdictions (exact match
/// after trimming).
pub fn is_known_state(state: &str) -> bool {
    let trimmed = state.trim();
    KNOWN_STATES.iter().any(|known| *known == trimmed)
}

#[cfg(test)]
mod tests {
    use super::{is_known_state, KNOWN_STATES};

    #[test]
    fn lists_states_and_union_territories() {
        assert_eq!(KNOWN_STATES.len(), 36);
        assert!(is_known_state(" Telangana "));
        assert!(!is_known_state("Atlantis"));
    }
}

//! Search query construction.

use crate::models::Region;

/// AI Act name variants, OR-joined with multi-word terms quoted.
const BASE_CLAUSE: &str =
    r#"("EU AI Act" OR "AI Act" OR KI-Verordnung OR EU-KI-Gesetz OR KI-Gesetz)"#;

const DACH_SCOPE: &str = "site:de OR site:at OR site:ch";
const EU_SCOPE: &str = "site:europa.eu OR site:ec.europa.eu OR site:eur-lex.europa.eu";
const ALL_SCOPE: &str =
    "site:de OR site:at OR site:ch OR site:europa.eu OR site:ec.europa.eu";

/// Build the provider query for `region`.
///
/// # Arguments
///
/// * `region` - Which site scope to AND onto the AI Act name variants
///
/// # Returns
///
/// The query string, e.g. `(... OR KI-Gesetz) AND (site:de OR site:at OR site:ch)` for DACH.
pub fn build_query(region: Region) -> String {
    let scope = match region {
        Region::Dach => DACH_SCOPE,
        Region::Eu => EU_SCOPE,
        Region::All => ALL_SCOPE,
    };
    format!("{BASE_CLAUSE} AND ({scope})")
}

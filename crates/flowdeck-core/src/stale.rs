use crate::types::LiveDataForNode;

/// Logical version recorded for source assets that have never been observed
/// and for assets materialized before logical versions existed. Such assets
/// are never reported stale.
pub const INITIAL_LOGICAL_VERSION: &str = "INITIAL";

/// The asset has live data but has never materialized.
pub fn is_asset_missing(live: Option<&LiveDataForNode>) -> bool {
    matches!(live, Some(data) if data.current_logical_version.is_none())
}

/// The asset's materialized logical version is known, meaningful, and differs
/// from the version projected from its upstream inputs.
pub fn is_asset_stale(live: Option<&LiveDataForNode>) -> bool {
    let Some(data) = live else {
        return false;
    };
    let Some(projected) = data.projected_logical_version.as_deref() else {
        return false;
    };
    match data.current_logical_version.as_deref() {
        Some(current) => current != INITIAL_LOGICAL_VERSION && current != projected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(current: Option<&str>, projected: Option<&str>) -> LiveDataForNode {
        LiveDataForNode {
            current_logical_version: current.map(str::to_string),
            projected_logical_version: projected.map(str::to_string),
        }
    }

    #[test]
    fn differing_versions_are_stale() {
        let data = live(Some("v2"), Some("v3"));
        assert!(is_asset_stale(Some(&data)));
        assert!(!is_asset_missing(Some(&data)));
    }

    #[test]
    fn initial_version_is_never_stale() {
        let data = live(Some("INITIAL"), Some("v3"));
        assert!(!is_asset_stale(Some(&data)));
    }

    #[test]
    fn never_materialized_is_missing_not_stale() {
        let data = live(None, Some("v3"));
        assert!(is_asset_missing(Some(&data)));
        assert!(!is_asset_stale(Some(&data)));
    }

    #[test]
    fn matching_versions_are_fresh() {
        let data = live(Some("v3"), Some("v3"));
        assert!(!is_asset_stale(Some(&data)));
    }

    #[test]
    fn partitioned_assets_have_no_projection() {
        let data = live(Some("v2"), None);
        assert!(!is_asset_stale(Some(&data)));
    }

    #[test]
    fn absent_live_data_is_neither() {
        assert!(!is_asset_missing(None));
        assert!(!is_asset_stale(None));
    }
}

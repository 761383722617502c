//! Connector registry - Manages available connectors.

use crate::connectors::fleetwise::VehiclesConnector;
use crate::Connector;
use std::sync::Arc;

/// Returns all available connectors.
pub fn get_all_connectors() -> Vec<Arc<dyn Connector>> {
    vec![Arc::new(VehiclesConnector::new())]
}

/// Looks up a connector by name.
pub fn find_connector(name: &str) -> Option<Arc<dyn Connector>> {
    get_all_connectors().into_iter().find(|c| c.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetsync::Configuration;

    #[test]
    fn test_get_all_connectors() {
        let connectors = get_all_connectors();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].name(), "fleetwise");
    }

    #[test]
    fn test_find_connector() {
        let connector = find_connector("fleetwise").unwrap();
        let tables = connector.schema(&Configuration::new());
        assert_eq!(tables[0].table, "vehicles");

        assert!(find_connector("github").is_none());
    }
}

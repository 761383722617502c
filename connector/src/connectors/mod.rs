pub mod fleetwise;

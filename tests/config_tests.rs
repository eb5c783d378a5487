use gabor_rs::Error;
use gabor_rs::prelude::*;

#[test]
fn test_config_validation() {
    let config = IdgtFbConfig::new(256, 1024, PhaseConvention::FrequencyInvariant);
    assert!(config.is_ok());

    let config = IdgtFbConfig::new(1024, 1024, PhaseConvention::TimeInvariant);
    assert!(config.is_ok());
}

#[test]
fn test_config_hop_larger_than_channels() {
    // Undersampled lattices are valid; they just cannot be inverted exactly.
    let config = IdgtFbConfig::new(2048, 1024, PhaseConvention::default()).unwrap();
    assert_eq!(config.redundancy(), 0.5);
}

#[test]
fn test_config_invalid_hop_size() {
    let config = IdgtFbConfig::new(0, 1024, PhaseConvention::default());
    assert!(matches!(config, Err(Error::InvalidSize { .. })));
}

#[test]
fn test_config_invalid_channels() {
    let config = IdgtFbConfig::new(256, 0, PhaseConvention::default());
    assert!(matches!(config, Err(Error::InvalidSize { .. })));
}

#[test]
fn test_phase_convention_from_raw() {
    assert!(PhaseConvention::try_from(0).is_ok());
    assert!(PhaseConvention::try_from(1).is_ok());
    assert!(matches!(
        PhaseConvention::try_from(-1),
        Err(Error::InvalidConvention(-1))
    ));
}

#[test]
fn test_error_messages() {
    let err = IdgtFbConfig::new(0, 8, PhaseConvention::default()).unwrap_err();
    assert_eq!(err.to_string(), "hop size must be positive, got 0");

    let err = PhaseConvention::try_from(3).unwrap_err();
    assert_eq!(err.to_string(), "unknown phase convention 3");
}

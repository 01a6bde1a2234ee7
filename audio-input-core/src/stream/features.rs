use crate::models::device::HardwareFeature;
use crate::traits::hardware::{HardwareUnit, VoiceProcessingProperty};

/// Property and value that implement `feature` being `enabled`.
///
/// Echo cancellation is exposed by the hardware as a bypass flag, so its
/// value is inverted.
pub fn feature_property(feature: HardwareFeature, enabled: bool) -> (VoiceProcessingProperty, bool) {
    match feature {
        HardwareFeature::EchoCancellation => (VoiceProcessingProperty::BypassVoiceProcessing, !enabled),
        HardwareFeature::AutomaticGainControl => (VoiceProcessingProperty::EnableAgc, enabled),
    }
}

/// Best effort: not every hardware route supports both properties.
pub(crate) fn apply_feature(unit: &mut dyn HardwareUnit, feature: HardwareFeature, enabled: bool) {
    let (property, value) = feature_property(feature, enabled);
    if let Err(status) = unit.set_voice_processing_property(property, value) {
        log::debug!("Ignoring error {} when setting {:?} to {}", status, property, value);
    }
}

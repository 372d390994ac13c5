//! Keyboard "camera": typed lines play the role of decoded barcodes.

use register_engine::{Camera, ScanError};
use tracing::info;

/// Has no device to open; reports the switch so the operator knows when
/// typed codes count.
#[derive(Debug, Default)]
pub struct KeyboardCamera;

impl Camera for KeyboardCamera {
    fn open(&mut self) -> Result<(), ScanError> {
        info!("Scanner on: type a barcode and press Enter");
        Ok(())
    }

    fn close(&mut self) {
        info!("Scanner off");
    }
}

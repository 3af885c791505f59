//! Detection of serial ports which may be USB-DMX interfaces.
//!
//! This is a helper for filling in output bindings by hand; the compile pipeline never uses
//! it. Classification is keyword based and therefore fuzzy: a port is a candidate when it
//! reports a USB vendor id or its description/manufacturer contains a known keyword.
use super::error::DeviceError;

/// Keywords found in the descriptions of common DMX interfaces and USB-serial bridges
pub const DMX_KEYWORDS: [&str; 9] = [
    "DMX",
    "ENTTEC",
    "FT232",
    "FTDI",
    "USB Serial",
    "CH340",
    "CP210",
    "Arduino",
    "Prolific",
];

const NO_DEVICE_NAME: &str = "No devices detected";
const NO_DEVICE_DESCRIPTION: &str = "No USB DMX devices found";

/// What the enumeration backend reports about a port
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortInfo {
    pub port: String,
    pub description: String,
    pub manufacturer: Option<String>,
    pub vendor_id: Option<u16>,
    pub hardware_id: String,
}

/// The facts classification is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub has_vendor_id: bool,
    pub matches_keyword: bool,
}

impl Capabilities {
    pub fn of(port: &PortInfo) -> Self {
        Self {
            has_vendor_id: port.vendor_id.is_some(),
            matches_keyword: matches_keyword(&port.description, port.manufacturer.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDevice {
    pub name: String,
    pub port: String,
    pub description: String,
    pub hardware_id: String,
}

impl CandidateDevice {
    /// The entry returned when nothing usable was found
    pub fn sentinel() -> Self {
        Self {
            name: String::from(NO_DEVICE_NAME),
            port: String::new(),
            description: String::from(NO_DEVICE_DESCRIPTION),
            hardware_id: String::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.port.is_empty() && self.name == NO_DEVICE_NAME
    }

    fn from_port(port: &PortInfo) -> Self {
        let name = match &port.manufacturer {
            Some(manufacturer) => format!("{} - {}", manufacturer, port.description),
            None => port.description.clone(),
        };
        Self {
            name,
            port: port.port.clone(),
            description: port.description.clone(),
            hardware_id: port.hardware_id.clone(),
        }
    }

    /// Human readable name, e.g. `FTDI - FT232R USB UART (/dev/ttyUSB0)`
    pub fn display_name(&self) -> String {
        if self.port.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.port)
        }
    }
}

/// Recover the port from a string made by [CandidateDevice::display_name]
pub fn port_from_display_name(display_name: &str) -> Option<&str> {
    let start = display_name.rfind('(')?;
    let end = display_name.rfind(')')?;
    if end <= start {
        return None;
    }
    Some(&display_name[start + 1..end])
}

/// Case insensitive keyword search over description and manufacturer
pub fn matches_keyword(description: &str, manufacturer: Option<&str>) -> bool {
    let description = description.to_uppercase();
    let manufacturer = manufacturer.unwrap_or("").to_uppercase();
    DMX_KEYWORDS.iter().any(|keyword| {
        let keyword = keyword.to_uppercase();
        description.contains(&keyword) || manufacturer.contains(&keyword)
    })
}

pub fn is_dmx_candidate(capabilities: Capabilities) -> bool {
    capabilities.has_vendor_id || capabilities.matches_keyword
}

/// Anything which can enumerate the serial ports of the machine
pub trait PortSource {
    fn ports(&self) -> Result<Vec<PortInfo>, DeviceError>;
}

/// Classify the ports of a source. Never fails: enumeration errors and an empty result both
/// yield the single sentinel entry.
pub fn list_candidate_devices_from(source: &dyn PortSource) -> Vec<CandidateDevice> {
    let ports = match source.ports() {
        Ok(ports) => ports,
        Err(e) => {
            spdlog::warn!("Error detecting USB devices: {e}");
            Vec::new()
        }
    };

    let mut devices: Vec<CandidateDevice> = ports
        .iter()
        .filter(|port| is_dmx_candidate(Capabilities::of(port)))
        .map(CandidateDevice::from_port)
        .collect();

    if devices.is_empty() {
        devices.push(CandidateDevice::sentinel());
    }
    devices
}

/// List the candidate devices of this machine using the default backend
pub fn list_candidate_devices() -> Vec<CandidateDevice> {
    list_candidate_devices_from(&SystemPorts)
}

/// The port enumeration of the host system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

#[cfg(feature = "serial")]
impl PortSource for SystemPorts {
    fn ports(&self) -> Result<Vec<PortInfo>, DeviceError> {
        let ports = serialport::available_ports()
            .map_err(|e| DeviceError::Enumeration(e.to_string()))?;
        Ok(ports
            .into_iter()
            .map(|p| match p.port_type {
                serialport::SerialPortType::UsbPort(usb) => PortInfo {
                    description: usb.product.clone().unwrap_or_else(|| p.port_name.clone()),
                    manufacturer: usb.manufacturer.clone(),
                    vendor_id: Some(usb.vid),
                    hardware_id: format!(
                        "USB VID:PID={:04X}:{:04X} SER={}",
                        usb.vid,
                        usb.pid,
                        usb.serial_number.as_deref().unwrap_or("")
                    ),
                    port: p.port_name,
                },
                _ => PortInfo {
                    description: p.port_name.clone(),
                    manufacturer: None,
                    vendor_id: None,
                    hardware_id: String::from("n/a"),
                    port: p.port_name,
                },
            })
            .collect())
    }
}

#[cfg(not(feature = "serial"))]
impl PortSource for SystemPorts {
    fn ports(&self) -> Result<Vec<PortInfo>, DeviceError> {
        Err(DeviceError::BackendUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPorts(Vec<PortInfo>);

    impl PortSource for FixedPorts {
        fn ports(&self) -> Result<Vec<PortInfo>, DeviceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenPorts;

    impl PortSource for BrokenPorts {
        fn ports(&self) -> Result<Vec<PortInfo>, DeviceError> {
            Err(DeviceError::Enumeration(String::from("permission denied")))
        }
    }

    fn port(name: &str, description: &str, manufacturer: Option<&str>, vid: Option<u16>) -> PortInfo {
        PortInfo {
            port: String::from(name),
            description: String::from(description),
            manufacturer: manufacturer.map(String::from),
            vendor_id: vid,
            hardware_id: String::new(),
        }
    }

    #[test]
    fn test_classification() {
        assert!(is_dmx_candidate(Capabilities {
            has_vendor_id: true,
            matches_keyword: false
        }));
        assert!(is_dmx_candidate(Capabilities {
            has_vendor_id: false,
            matches_keyword: true
        }));
        assert!(!is_dmx_candidate(Capabilities {
            has_vendor_id: false,
            matches_keyword: false
        }));
        assert!(matches_keyword("Enttec dmx usb pro", None));
        assert!(matches_keyword("ttyS0", Some("ftdi")));
        assert!(!matches_keyword("Bluetooth modem", Some("Acme")));
    }

    #[test]
    fn test_lists_candidates() {
        let source = FixedPorts(vec![
            port("/dev/ttyUSB0", "FT232R USB UART", Some("FTDI"), Some(0x0403)),
            port("/dev/ttyS0", "ttyS0", None, None),
            port("COM4", "Arduino Uno", None, None),
        ]);
        let devices = list_candidate_devices_from(&source);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "FTDI - FT232R USB UART");
        assert_eq!(
            devices[0].display_name(),
            "FTDI - FT232R USB UART (/dev/ttyUSB0)"
        );
        assert_eq!(devices[1].port, "COM4");
    }

    #[test]
    fn test_sentinel() {
        let devices = list_candidate_devices_from(&FixedPorts(vec![port("ttyS0", "ttyS0", None, None)]));
        assert_eq!(devices, vec![CandidateDevice::sentinel()]);
        assert!(devices[0].is_sentinel());
        assert_eq!(devices[0].display_name(), "No devices detected");

        let devices = list_candidate_devices_from(&BrokenPorts);
        assert_eq!(devices.len(), 1);
        assert!(devices[0].is_sentinel());
    }

    #[test]
    fn test_port_from_display_name() {
        assert_eq!(port_from_display_name("FTDI USB Serial (COM3)"), Some("COM3"));
        assert_eq!(port_from_display_name("No devices detected"), None);
    }
}

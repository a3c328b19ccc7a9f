//! Device identity string parsing.
//!
//! Identity strings have the form `type:name:bustype-buspos[-extra]:serial`,
//! e.g. `Mouse:DeathAdder:USB-0003-1:1234`. Parsing is purely positional and
//! tolerant: malformed input yields a partially populated identity instead
//! of an error, so callers must cope with empty fields.

pub const DEVTYPE_UNKNOWN: &str = "Unknown";
pub const BUSTYPE_UNKNOWN: &str = "Unknown";

/// Parsed device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevId {
    pub devtype: String,
    pub devname: String,
    pub bustype: String,
    pub buspos: String,
    pub devid: String,
}

impl DevId {
    pub fn parse(idstr: &str) -> Self {
        let mut dev = Self {
            devtype: DEVTYPE_UNKNOWN.to_string(),
            devname: String::new(),
            bustype: BUSTYPE_UNKNOWN.to_string(),
            buspos: String::new(),
            devid: String::new(),
        };

        let mut fields = idstr.split(':');
        let Some(devtype) = fields.next() else {
            return dev;
        };
        dev.devtype = devtype.to_string();
        let Some(devname) = fields.next() else {
            return dev;
        };
        dev.devname = devname.to_string();
        let Some(bus) = fields.next() else {
            return dev;
        };

        let mut bus_parts = bus.split('-');
        if let Some(bustype) = bus_parts.next() {
            dev.bustype = bustype.to_string();
        }
        let Some(buspos) = bus_parts.next() else {
            return dev;
        };
        dev.buspos = buspos.to_string();
        // The bus position may carry one secondary dash component.
        if let Some(extra) = bus_parts.next() {
            dev.buspos.push('-');
            dev.buspos.push_str(extra);
        }

        let Some(devid) = fields.next() else {
            return dev;
        };
        dev.devid = devid.to_string();
        dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_identity() {
        let dev = DevId::parse("Mouse:DeathAdder:USB-0003-1:1234");
        assert_eq!(dev.devtype, "Mouse");
        assert_eq!(dev.devname, "DeathAdder");
        assert_eq!(dev.bustype, "USB");
        assert_eq!(dev.buspos, "0003-1");
        assert_eq!(dev.devid, "1234");
    }

    #[test]
    fn test_simple_bus_position() {
        let dev = DevId::parse("Mouse:Krait:USB-2:serial0");
        assert_eq!(dev.buspos, "2");
        assert_eq!(dev.devid, "serial0");
    }

    #[test]
    fn test_partial_identity() {
        let dev = DevId::parse("Mouse:Krait");
        assert_eq!(dev.devtype, "Mouse");
        assert_eq!(dev.devname, "Krait");
        assert_eq!(dev.bustype, BUSTYPE_UNKNOWN);
        assert_eq!(dev.buspos, "");
        assert_eq!(dev.devid, "");
    }

    #[test]
    fn test_missing_bus_position() {
        let dev = DevId::parse("Mouse:Krait:USB:1234");
        assert_eq!(dev.bustype, "USB");
        assert_eq!(dev.buspos, "");
        // The serial is never reached once the bus field is malformed.
        assert_eq!(dev.devid, "");
    }
}

use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};

const PREFIX: &str = "PRCL";

/// Receipt code shown to a payer: `PRCL-YYYYMMDD-XXXXXX`.
///
/// The suffix is 3 bytes from the OS CSPRNG in uppercase hex. Uniqueness rests on
/// those 24 bits alone.
pub fn generate_tracking_id() -> String {
    let mut bytes = [0u8; 3];
    OsRng.fill_bytes(&mut bytes);
    format_tracking_id(Utc::now(), bytes)
}

fn format_tracking_id(at: DateTime<Utc>, bytes: [u8; 3]) -> String {
    format!(
        "{}-{}-{:02X}{:02X}{:02X}",
        PREFIX,
        at.format("%Y%m%d"),
        bytes[0],
        bytes[1],
        bytes[2]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_date_and_uppercase_hex() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 59).unwrap();
        assert_eq!(format_tracking_id(at, [0x0a, 0xbc, 0xff]), "PRCL-20260307-0ABCFF");
    }

    #[test]
    fn generated_id_has_expected_shape() {
        let id = generate_tracking_id();
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PRCL");
        assert_eq!(parts[1], Utc::now().format("%Y%m%d").to_string());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn concurrent_generation_needs_no_coordination() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..64).map(|_| generate_tracking_id()).collect::<Vec<_>>()))
            .collect();

        let ids: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        assert_eq!(ids.len(), 512);
        assert!(ids.iter().all(|id| id.starts_with("PRCL-")));
    }
}

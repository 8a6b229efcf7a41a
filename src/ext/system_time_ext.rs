use std::time::SystemTime;

use crate::clocks::Datetime;

pub trait SystemTimeExt {
    fn to_datetime(&self) -> Datetime;
}

impl SystemTimeExt for SystemTime {
    /// Times before the Unix epoch collapse to the epoch itself.
    fn to_datetime(&self) -> Datetime {
        self.duration_since(SystemTime::UNIX_EPOCH)
            .map(|since_epoch| Datetime {
                seconds: since_epoch.as_secs(),
                nanoseconds: since_epoch.subsec_nanos(),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn splits_seconds_and_nanoseconds() {
        let time = SystemTime::UNIX_EPOCH + Duration::new(42, 7);
        assert_eq!(
            time.to_datetime(),
            Datetime {
                seconds: 42,
                nanoseconds: 7
            }
        );
    }

    #[test]
    fn pre_epoch_time_is_epoch() {
        let time = SystemTime::UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(time.to_datetime(), Datetime::default());
    }
}

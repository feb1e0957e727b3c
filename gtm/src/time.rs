pub trait TimeSource {
    // Milliseconds since the unix epoch
    fn current_millis(&self) -> i64;
}

#[derive(Clone)]
pub struct SystemTime {}

impl TimeSource for SystemTime {
    fn current_millis(&self) -> i64 {
        let time = time::OffsetDateTime::now_utc();

        (time.unix_timestamp_nanos() / 1_000_000) as i64
    }
}

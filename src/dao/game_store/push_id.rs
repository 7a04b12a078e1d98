//! Firebase-style push identifiers: 8 timestamp characters followed by 12
//! random characters, all drawn from a 64-symbol alphabet whose ASCII order
//! matches its numeric order, so ids sort by creation time.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIMESTAMP_LEN: usize = 8;
const RANDOM_LEN: usize = 12;

/// Total length of a generated id.
pub const PUSH_ID_LEN: usize = TIMESTAMP_LEN + RANDOM_LEN;

/// Generate a push id for a record created at `now`.
pub fn generate(now: SystemTime) -> String {
    let mut millis = now
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);

    let mut stamp = [0u8; TIMESTAMP_LEN];
    for slot in stamp.iter_mut().rev() {
        *slot = PUSH_CHARS[(millis % 64) as usize];
        millis /= 64;
    }

    let mut rng = rand::rng();
    let mut id = String::with_capacity(PUSH_ID_LEN);
    id.extend(stamp.iter().map(|&byte| byte as char));
    for _ in 0..RANDOM_LEN {
        id.push(PUSH_CHARS[rng.random_range(0..PUSH_CHARS.len())] as char);
    }
    id
}

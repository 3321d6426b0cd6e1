use crate::common::current_time_secs;
use log::{info, warn};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;
use std::thread;
use std::time::Duration;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Produces the 12 raw bytes of an [ObjectId](crate::collection::ObjectId).
///
/// Layout: 4 bytes of big-endian seconds, 3 bytes of machine identifier,
/// 2 bytes of process identifier and a 3 byte big-endian counter. The counter
/// restarts at zero every second, so ids from one generator increase
/// strictly. Once 2^24 ids were handed out within one second the generator
/// waits for the next second.
pub struct ObjectIdGenerator {
    machine_id: [u8; 3],
    process_id: [u8; 2],
    state: Mutex<CounterState>,
}

struct CounterState {
    secs: u32,
    next: u32,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let machine_id = Self::machine_id();
        let process_id = Self::process_id();

        info!(
            "Initialized object id generator with machine id: {:02x}{:02x}{:02x}",
            machine_id[0], machine_id[1], machine_id[2]
        );

        ObjectIdGenerator {
            machine_id,
            process_id,
            state: Mutex::new(CounterState { secs: 0, next: 0 }),
        }
    }

    pub fn next_bytes(&self) -> [u8; 12] {
        let mut state = self.state.lock();

        // a clock that went backwards keeps using the last second
        let mut secs = current_time_secs().max(state.secs);
        if secs == state.secs && state.next > COUNTER_MASK {
            warn!("Object id counter exhausted for second {}, waiting", secs);
            while secs <= state.secs {
                thread::sleep(Duration::from_millis(10));
                secs = current_time_secs();
            }
        }

        if secs != state.secs {
            state.secs = secs;
            state.next = 0;
        }

        let counter = state.next;
        state.next += 1;
        Self::compose(secs, self.machine_id, self.process_id, counter)
    }

    fn compose(secs: u32, machine_id: [u8; 3], process_id: [u8; 2], counter: u32) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..7].copy_from_slice(&machine_id);
        bytes[7..9].copy_from_slice(&process_id);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        bytes
    }

    fn machine_id() -> [u8; 3] {
        let uuid = uuid::Uuid::new_v4();
        let uid = uuid.as_bytes();
        let rnd = OsRng.gen::<[u8; 3]>();

        let machine_id = [
            uid[uid.len() - 1] ^ rnd[0],
            uid[uid.len() - 2] ^ rnd[1],
            uid[uid.len() - 3] ^ rnd[2],
        ];
        if machine_id == [0, 0, 0] {
            warn!("Generated an all-zero machine id, using a random one");
            return [OsRng.gen_range(1..=u8::MAX), rnd[1], rnd[2]];
        }
        machine_id
    }

    fn process_id() -> [u8; 2] {
        let pid = std::process::id();
        // fold the upper half in so high pids still differ
        let folded = (pid ^ (pid >> 16)) as u16;
        folded.to_be_bytes()
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#![no_main]

use bgzfstream::{BgzfStream, MemoryDevice, VirtualOffset};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    // First 8 bytes pick a virtual offset, the rest is the stream
    let offset = VirtualOffset::from(u64::from_le_bytes(data[..8].try_into().unwrap()));
    let Ok(mut stream) = BgzfStream::reader(MemoryDevice::new(data[8..].to_vec())) else {
        return;
    };

    let mut buf = [0u8; 4096];
    while let Ok(n) = stream.read(&mut buf) {
        if n == 0 {
            break;
        }
    }

    if stream.seek(offset).is_ok() {
        let _ = stream.read(&mut buf);
    }
});

fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chunkwire_protocol::{Chunk, Encoding};
    use chunkwire_transfer::{
        ChunkOptions, ReceiverConfig, SingleTransferReceiver, create_chunks, join_chunks,
    };
    use serde::{Deserialize, Serialize};

    /// A transfer as a JSON peer puts it on the wire: the content, the
    /// options it was split with, and the chunks in arrival order. Ids are
    /// SHA-256, except in `transfer_sha1.json`, which carries the 40-char
    /// SHA-1 ids of older JavaScript peers.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TransferFixture {
        content: String,
        chunk_size: usize,
        encoding: Encoding,
        chunks: Vec<Chunk>,
    }

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    fn load_transfer(name: &str) -> TransferFixture {
        serde_json::from_value(load_fixture(name))
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  peer: {fixture}\n  Rust: {reserialized}"
        );
    }

    const TRANSFERS: [&str; 4] = [
        "transfer_base64.json",
        "transfer_raw.json",
        "transfer_gzip_shuffled.json",
        "transfer_sha1.json",
    ];

    // --- Wire shape ---

    #[test]
    fn fixture_transfers_roundtrip() {
        for name in TRANSFERS {
            roundtrip_test::<TransferFixture>(name);
        }
    }

    #[test]
    fn fixture_chunk_options() {
        roundtrip_test::<ChunkOptions>("chunk_options.json");
        let opts: ChunkOptions = serde_json::from_value(load_fixture("chunk_options.json")).unwrap();
        assert_eq!(opts.chunk_size, 1024);
        assert!(!opts.compress);
        assert_eq!(opts.encoding, Encoding::Raw);
    }

    #[test]
    fn fixture_receiver_config() {
        roundtrip_test::<ReceiverConfig>("receiver_config.json");
        let cfg: ReceiverConfig =
            serde_json::from_value(load_fixture("receiver_config.json")).unwrap();
        assert_eq!(cfg.timeout.as_millis(), 50);
        assert!(cfg.verify);
        assert_eq!(cfg.event_capacity, 8);
    }

    #[test]
    fn raw_fragments_are_integer_arrays() {
        let fixture = load_fixture("transfer_raw.json");
        assert!(fixture["chunks"][0]["data"].is_array());
        let fixture = load_fixture("transfer_base64.json");
        assert!(fixture["chunks"][0]["data"].is_string());
    }

    // --- Reassembly of peer-produced chunks ---

    #[test]
    fn peer_transfers_reassemble() {
        for name in TRANSFERS {
            let fixture = load_transfer(name);
            let payload = join_chunks(fixture.chunks)
                .unwrap_or_else(|e| panic!("failed to reassemble {name}: {e}"));
            assert_eq!(String::from_utf8(payload).unwrap(), fixture.content);
        }
    }

    #[test]
    fn peer_gzip_transfer_verifies_over_json() {
        let fixture = load_transfer("transfer_gzip_shuffled.json");
        let first = &fixture.chunks[0];
        let mut receiver = SingleTransferReceiver::new(first.id.clone(), first.total).unwrap();
        for chunk in &fixture.chunks {
            let message = chunk.to_json().unwrap();
            receiver.add_json(&message).unwrap();
        }
        assert!(receiver.done());
        assert!(receiver.verify().unwrap());
        assert_eq!(receiver.to_text().unwrap(), fixture.content);
    }

    #[test]
    fn sha1_peer_transfer_verifies() {
        let fixture = load_transfer("transfer_sha1.json");
        let first = &fixture.chunks[0];
        assert_eq!(first.id.len(), 40);
        let mut receiver = SingleTransferReceiver::new(first.id.clone(), first.total).unwrap();
        for chunk in fixture.chunks {
            receiver.add_chunk(chunk).unwrap();
        }
        assert!(receiver.verify().unwrap());
        assert_eq!(receiver.to_text().unwrap(), fixture.content);
    }

    // --- Sender parity: Rust produces the same chunks as the peer ---

    #[test]
    fn uncompressed_chunks_match_peer() {
        for name in ["transfer_base64.json", "transfer_raw.json"] {
            let fixture = load_transfer(name);
            let opts = ChunkOptions::new(fixture.chunk_size).with_encoding(fixture.encoding);
            let chunks = create_chunks(fixture.content.as_bytes(), &opts).unwrap();
            assert_eq!(chunks, fixture.chunks, "chunk mismatch for {name}");
        }
    }
}

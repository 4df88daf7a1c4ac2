use std::sync::{Arc, Mutex};

use super::*;
use crate::boc;
use crate::cell::HashBytes;
use crate::error::Error;
use crate::models::{BlockInfoTag, BlockTag, CurrencyCollection};

/// Masterchain block 42 with a single parent, generic BOC with CRC32.
const BLOCK_BOC: &str = "b5ee9c724101070100c100041011ef55aa000003e8050201010000020db8e48dfb101f420403000e00021dcd650000000a082820c000018a9bc7a9880000000000000000002a0000000100ffffffff80000000000000006553f10001f400000000000003e800000000000003ed1122334400000007000000290000001e0600980000002900000000000003e7aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb56b1344c";

const BLOCK_BOC_BASE64: &str = "te6cckEBBwEAwQAEEBHvVaoAAAPoBQIBAQAAAg245I37EB9CBAMADgACHc1lAAAACggoIMAAAYqbx6mIAAAAAAAAAAAAKgAAAAEA/////4AAAAAAAAAAZVPxAAH0AAAAAAAAA+gAAAAAAAAD7REiM0QAAAAHAAAAKQAAAB4GAJgAAAApAAAAAAAAA+eqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqru7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7u7VrE0TA==";

const BLOCK_FILE_HASH: &str = "ad19a78335aa95d99484fba6246ff61bda3f982b7bb5f92d7e0e0876a857eefe";

fn config(encoding: &str) -> IndexerConfig {
    IndexerConfig::from_json(&format!(
        r#"{{
            "transport": {{ "kind": "mock" }},
            "payload_encoding": "{encoding}",
            "data_sources": [
                {{
                    "handlers": [
                        {{ "kind": "block", "handler": "blocks" }},
                        {{ "kind": "block", "handler": "unwatched" }},
                        {{ "kind": "transaction", "handler": "blocks" }}
                    ]
                }}
            ]
        }}"#
    ))
    .unwrap()
}

fn consumer(encoding: &str) -> (Consumer, Arc<Mutex<Vec<DecodedBlock>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));

    let mut subscribers = Subscribers::new();
    subscribers.subscribe("blocks", {
        let received = received.clone();
        move |block: &DecodedBlock| received.lock().unwrap().push(block.clone())
    });

    let consumer = Consumer::new(config(encoding), &subscribers).unwrap();
    (consumer, received)
}

#[test]
fn decode_block_payload() {
    let (consumer, _) = consumer("raw");
    let decoded = consumer.decode(&hex::decode(BLOCK_BOC).unwrap()).unwrap();
    assert_eq!(
        decoded.file_hash,
        BLOCK_FILE_HASH.parse::<HashBytes>().unwrap()
    );

    let block = &decoded.block;
    assert_eq!(block.tag, BlockTag::V1);
    assert_eq!(block.global_id, 1000);

    let info = &block.info;
    assert_eq!(info.tag, BlockInfoTag::WithMs);
    assert_eq!(info.seq_no, 42);
    assert_eq!(info.vert_seq_no, 1);
    assert!(info.is_masterchain());
    assert!(info.shard.is_masterchain());
    assert_eq!(info.shard.to_string(), "-1:8000000000000000");
    assert_eq!(info.gen_utime, 1700000000);
    assert_eq!(info.gen_utime_ms, 500);
    assert_eq!(info.start_lt, 1000);
    assert_eq!(info.end_lt, 1005);
    assert_eq!(info.gen_validator_list_hash_short, 0x11223344);
    assert_eq!(info.gen_catchain_seqno, 7);
    assert_eq!(info.min_ref_mc_seqno, 41);
    assert_eq!(info.prev_key_block_seqno, 30);
    assert_eq!(info.gen_software, None);

    assert_eq!(info.prev_ref.seq_no, 41);
    assert_eq!(info.prev_ref.end_lt, 999);
    assert_eq!(info.prev_ref.root_hash, HashBytes([0xaa; 32]));
    assert_eq!(info.prev_ref.file_hash, HashBytes([0xbb; 32]));

    let value_flow = &block.value_flow;
    assert_eq!(value_flow.fees_collected, CurrencyCollection::new(1000));
    assert_eq!(value_flow.from_prev_block, CurrencyCollection::new(5));
    assert_eq!(value_flow.to_next_block, CurrencyCollection::new(6));
    assert_eq!(value_flow.created, CurrencyCollection::new(1_000_000_000));
    assert!(value_flow.minted.is_zero());
    assert!(value_flow.copyleft_rewards().unwrap().is_empty());

    assert!(block.state_update().is_err());
    assert!(block.extra().is_err());

    let json = serde_json::to_value(&decoded).unwrap();
    assert_eq!(json["file_hash"], BLOCK_FILE_HASH);
    assert_eq!(json["block"]["info"]["seq_no"], 42);
    assert_eq!(json["block"]["value_flow"]["created"]["tokens"], "1000000000");
    assert_eq!(json["block"]["state_update"], "not_decoded");
}

#[test]
fn payload_encodings_agree() {
    let (raw, _) = consumer("raw");
    let (hex, _) = consumer("hex");
    let (base64, _) = consumer("base64");

    let expected = raw.decode(&hex::decode(BLOCK_BOC).unwrap()).unwrap();
    assert_eq!(hex.decode(BLOCK_BOC.as_bytes()).unwrap(), expected);
    assert_eq!(base64.decode(BLOCK_BOC_BASE64.as_bytes()).unwrap(), expected);

    assert_eq!(
        hex.decode(BLOCK_BOC_BASE64.as_bytes()),
        Err(ConsumerError::Boc(boc::de::Error::InvalidEncoding))
    );
}

#[test]
fn dispatch_blocks() {
    let (consumer, received) = consumer("hex");

    assert!(consumer.process("/block/blocks", BLOCK_BOC.as_bytes()));
    assert!(consumer.process("/block/blocks", BLOCK_BOC.as_bytes()));

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].block.info.seq_no, 42);
    assert_eq!(received[0], received[1]);

    assert_eq!(
        consumer.stats(),
        ConsumerStats {
            delivered: 2,
            failed: 0
        }
    );
}

#[test]
fn route_errors() {
    let (consumer, received) = consumer("hex");

    assert_eq!(
        consumer.handle("/block/missing", BLOCK_BOC.as_bytes()),
        Err(ConsumerError::UnknownRoute("/block/missing".to_owned()))
    );
    assert_eq!(
        consumer.handle("blocks", BLOCK_BOC.as_bytes()),
        Err(ConsumerError::UnknownRoute("blocks".to_owned()))
    );
    assert_eq!(
        consumer.handle("/transaction/blocks", BLOCK_BOC.as_bytes()),
        Err(ConsumerError::UnsupportedKind(ItemKind::Transaction))
    );
    assert_eq!(
        consumer.handle("/block/unwatched", BLOCK_BOC.as_bytes()),
        Err(ConsumerError::NoSubscriber(Route::new(
            ItemKind::Block,
            "unwatched"
        )))
    );

    assert!(received.lock().unwrap().is_empty());
    assert_eq!(consumer.stats(), ConsumerStats::default());
}

#[test]
fn malformed_items_are_skipped() {
    let (consumer, received) = consumer("hex");

    // Broken checksum
    let mut corrupted = BLOCK_BOC.to_owned();
    corrupted.replace_range(corrupted.len() - 2.., "00");

    // Root cell with an unknown block tag
    let wrong_tag = BLOCK_BOC.replacen("11ef55aa", "deadbeef", 1);
    let wrong_tag = {
        // Fix the checksum so that only the tag is wrong
        let mut raw = hex::decode(&wrong_tag).unwrap();
        let len = raw.len() - 4;
        let crc = crc32c::crc32c(&raw[..len]);
        raw[len..].copy_from_slice(&crc.to_le_bytes());
        hex::encode(raw)
    };

    assert!(!consumer.process("/block/blocks", corrupted.as_bytes()));
    assert!(!consumer.process("/block/blocks", b"not a boc"));
    assert!(!consumer.process("/block/blocks", wrong_tag.as_bytes()));
    assert!(!consumer.process("/message/blocks", BLOCK_BOC.as_bytes()));
    assert!(consumer.process("/block/blocks", BLOCK_BOC.as_bytes()));

    assert_eq!(
        consumer.handle("/block/blocks", corrupted.as_bytes()),
        Err(ConsumerError::Boc(boc::de::Error::InvalidChecksum))
    );
    assert_eq!(
        consumer.handle("/block/blocks", wrong_tag.as_bytes()),
        Err(ConsumerError::Decode(Error::InvalidTag {
            record: "Block",
            tag: 0xdeadbeef
        }))
    );

    assert_eq!(received.lock().unwrap().len(), 1);
    assert_eq!(
        consumer.stats(),
        ConsumerStats {
            delivered: 1,
            failed: 4
        }
    );
}

#[cfg(feature = "rayon")]
#[test]
fn process_batch_in_order() {
    let (consumer, received) = consumer("base64");

    let items = [
        ("/block/blocks", BLOCK_BOC_BASE64),
        ("/block/blocks", "AAAA"),
        ("/block/unwatched", BLOCK_BOC_BASE64),
        ("/block/blocks", BLOCK_BOC_BASE64),
    ];
    assert_eq!(consumer.process_batch(&items), 2);

    assert_eq!(received.lock().unwrap().len(), 2);
    assert_eq!(
        consumer.stats(),
        ConsumerStats {
            delivered: 2,
            failed: 2
        }
    );
}

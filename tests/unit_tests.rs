use std::io::Write;
use tagged_messaging::commands::produce::parse_header;
use tagged_messaging::{BrokerOpts, MessagingConfig};
use tagged_messaging_kafka::{AckMode, ConversionStrategy};

#[test]
fn test_broker_opts_defaults() {
    let config = BrokerOpts::default().load().unwrap();

    assert_eq!(config, MessagingConfig::default());
    assert_eq!(config.consumer.brokers, "localhost:9092");
    assert_eq!(config.producer.brokers, "localhost:9092");
}

#[test]
fn test_broker_opts_loads_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[consumer]
brokers = "kafka:9092"
group_id = "generic-consumer"
topic = "generic-messages"
conversion = "messaging"
ack_mode = "record"

[producer]
brokers = "kafka:9092"
mirror_native_headers = true
"#
    )
    .unwrap();

    let opts = BrokerOpts {
        brokers: None,
        config: Some(file.path().to_path_buf()),
    };
    let config = opts.load().unwrap();

    assert_eq!(config.consumer.brokers, "kafka:9092");
    assert_eq!(config.consumer.group_id, "generic-consumer");
    assert_eq!(config.consumer.conversion, ConversionStrategy::Messaging);
    assert_eq!(config.consumer.ack_mode, AckMode::Record);
    assert!(config.producer.mirror_native_headers);
    // Unset fields keep their defaults
    assert_eq!(config.consumer.auto_offset_reset, "earliest");
    assert!(!config.consumer.enable_auto_commit);
}

#[test]
fn test_broker_override_applies_to_both_sides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[consumer]\nbrokers = \"from-file:9092\"").unwrap();

    let opts = BrokerOpts {
        brokers: Some("override:9092".to_string()),
        config: Some(file.path().to_path_buf()),
    };
    let config = opts.load().unwrap();

    assert_eq!(config.consumer.brokers, "override:9092");
    assert_eq!(config.producer.brokers, "override:9092");
}

#[test]
fn test_broker_opts_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = BrokerOpts {
        brokers: None,
        config: Some(dir.path().join("missing.toml")),
    };

    let err = opts.load().unwrap_err();
    assert!(format!("{err:#}").contains("missing.toml"));
}

#[test]
fn test_broker_opts_invalid_toml_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[consumer]\nack_mode = \"sometimes\"").unwrap();

    let opts = BrokerOpts {
        brokers: None,
        config: Some(file.path().to_path_buf()),
    };
    assert!(opts.load().is_err());
}

#[test]
fn test_parse_header_from_cli() {
    let (key, value) = parse_header("my_header2=value 2").unwrap();
    assert_eq!(key, "my_header2");
    assert_eq!(value, serde_json::json!("value 2"));
}

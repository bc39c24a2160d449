//! The host over a real LMDB environment.

use ferry_host::{CallContext, ContractHost, HostConfig};
use ferry_nullables::NullOracle;
use ferry_oracle::{LoggedEvent, SourceEvent};
use ferry_types::{Address, ErrorKind, TargetAddress, TxHash};

fn config(dir: &tempfile::TempDir) -> HostConfig {
    let mut config = HostConfig {
        data_dir: dir.path().join("state"),
        map_size: 16 << 20,
        ..HostConfig::default()
    };
    config.contracts.bridge = Address::new([0xb0; 20]);
    config
}

fn oracle_with_inbound(tx: TxHash, tuid: u64, to: TargetAddress) -> NullOracle {
    let oracle = NullOracle::new(200);
    oracle.add_log(
        tx,
        LoggedEvent {
            event: SourceEvent::TransferredOut {
                tuid: Some(tuid),
                from: Address::new([0x11; 20]),
                to: to.as_bytes().to_vec(),
                value: Some(25),
            },
            block_number: 100,
            tx_index: 0,
        },
    );
    oracle
}

#[test]
fn consumed_tickets_survive_reopen() {
    ferry_utils::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    let alice = TargetAddress::new([0xaa; 20]);
    let ctx = CallContext::new(alice, 10);
    let tx = TxHash::new([9; 32]);

    {
        let host = ContractHost::open(&config, oracle_with_inbound(tx, 5, alice)).unwrap();
        host.transfer_in(&ctx, &tx).unwrap();
        host.transfer_out(&ctx, Address::new([0x22; 20]), 5).unwrap();
    }

    let host = ContractHost::open(&config, oracle_with_inbound(tx, 5, alice)).unwrap();
    assert_eq!(host.balance_of(&alice).unwrap(), 20);
    assert_eq!(host.total_supply().unwrap(), 20);
    assert_eq!(host.out_tuid().unwrap(), 1);
    assert!(host.is_in_tuid_consumed(5).unwrap());

    let err = host.transfer_in(&ctx, &tx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Replay);
    assert_eq!(host.balance_of(&alice).unwrap(), 20);
}

#[test]
fn config_file_drives_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ferry.toml");
    let mut config = config(&dir);
    config.elections.first_election_block = 500;
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    let loaded = HostConfig::from_toml_file(&path).unwrap();
    assert_eq!(loaded, config);
    let host = ContractHost::open(&loaded, NullOracle::new(0)).unwrap();
    assert_eq!(host.current_election_block().unwrap(), 500);
    assert_eq!(host.number_of_elections().unwrap(), 0);
}

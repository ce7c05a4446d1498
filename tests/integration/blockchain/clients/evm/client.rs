use alloy::primitives::{address, Bytes, B256, U256};
use mockall::predicate;
use serde_json::{json, Value};

use crate::integration::mocks::MockEVMTransportClient;
use surge_monitor::{
	models::BlockTransaction,
	services::blockchain::{BlockChainClient, BlockChainError, EvmClient, EvmClientTrait},
};

fn rpc_result(result: Value) -> Value {
	json!({"jsonrpc": "2.0", "id": 1, "result": result})
}

#[tokio::test]
async fn test_get_block_requests_full_transactions() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(
			predicate::eq("eth_getBlockByNumber"),
			predicate::eq(Some(json!(["0x7fe24a", true]))),
		)
		.times(1)
		.returning(|_, _| {
			Ok(rpc_result(json!({
				"number": "0x7fe24a",
				"hash": format!("{}", B256::repeat_byte(0x22)),
				"timestamp": "0x6553f100",
				"transactions": [
					{
						"hash": format!("{}", B256::repeat_byte(0x01)),
						"from": "0x000000000000000000000000000000000000000f",
						"to": "0x1062916b1be3c034c1dc6c26f682daf1861a3909",
						"input": "0xc04b8d59",
						"value": "0x0"
					},
					format!("{}", B256::repeat_byte(0x02))
				]
			})))
		});

	let client = EvmClient::new_with_transport(transport);
	let block = client.get_block(8_381_002).await.unwrap();

	assert_eq!(block.number(), 8_381_002);
	assert_eq!(block.full_transactions().count(), 1);
	assert_eq!(block.hashes_without_body(), vec![B256::repeat_byte(0x02)]);
	assert!(matches!(block.transactions[0], BlockTransaction::Full(_)));
}

#[tokio::test]
async fn test_missing_block_is_block_not_found() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_getBlockByNumber"), predicate::always())
		.times(1)
		.returning(|_, _| Ok(rpc_result(Value::Null)));

	let client = EvmClient::new_with_transport(transport);
	let result = client.get_block(99).await;

	assert!(matches!(result, Err(BlockChainError::BlockNotFound(99))));
	assert!(result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_get_latest_block_number() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_blockNumber"), predicate::always())
		.times(1)
		.returning(|_, _| Ok(rpc_result(json!("0x10"))));

	let client = EvmClient::new_with_transport(transport);

	assert_eq!(client.get_latest_block_number().await.unwrap(), 16);
}

#[tokio::test]
async fn test_pending_receipt_is_none() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_getTransactionReceipt"), predicate::always())
		.times(1)
		.returning(|_, _| Ok(rpc_result(Value::Null)));

	let client = EvmClient::new_with_transport(transport);
	let receipt = client
		.get_transaction_receipt(B256::repeat_byte(0x05))
		.await
		.unwrap();

	assert!(receipt.is_none());
}

#[tokio::test]
async fn test_receipt_is_parsed() {
	let token = address!("1514000000000000000000000000000000000000");
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_getTransactionReceipt"), predicate::always())
		.times(1)
		.returning(move |_, _| {
			Ok(rpc_result(json!({
				"transactionHash": format!("{}", B256::repeat_byte(0x05)),
				"blockNumber": "0x10",
				"gasUsed": "0x5208",
				"status": "0x1",
				"logs": [{
					"address": format!("{}", token),
					"topics": [
						"0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
						"0x000000000000000000000000000000000000000000000000000000000000000a",
						"0x000000000000000000000000000000000000000000000000000000000000000b"
					],
					"data": "0x00000000000000000000000000000000000000000000000000000000000003e8"
				}]
			})))
		});

	let client = EvmClient::new_with_transport(transport);
	let receipt = client
		.get_transaction_receipt(B256::repeat_byte(0x05))
		.await
		.unwrap()
		.unwrap();

	assert!(receipt.succeeded());
	assert_eq!(receipt.block_number(), Some(16));
	assert_eq!(receipt.gas_used(), 21_000);
	assert_eq!(receipt.logs.len(), 1);
	assert_eq!(receipt.logs[0].address, token);
}

#[tokio::test]
async fn test_call_surfaces_revert_data() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_call"), predicate::always())
		.times(1)
		.returning(|_, _| {
			Ok(json!({
				"jsonrpc": "2.0",
				"id": 1,
				"error": {"code": 3, "message": "execution reverted", "data": "0x08c379a0"}
			}))
		});

	let client = EvmClient::new_with_transport(transport);
	let result = client
		.call(address!("865E2Bff1d5f9a01b91196D31126C2e432bC0F6C"), Bytes::new())
		.await;

	match result {
		Err(BlockChainError::RpcError { code, data, .. }) => {
			assert_eq!(code, 3);
			assert_eq!(data.as_deref(), Some("0x08c379a0"));
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[tokio::test]
async fn test_get_balance_and_gas_price() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_getBalance"), predicate::always())
		.times(1)
		.returning(|_, _| Ok(rpc_result(json!("0xde0b6b3a7640000"))));
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_gasPrice"), predicate::always())
		.times(1)
		.returning(|_, _| Ok(rpc_result(json!("0x3b9aca00"))));

	let client = EvmClient::new_with_transport(transport);

	assert_eq!(
		client.get_balance(address!("000000000000000000000000000000000000000f")).await.unwrap(),
		U256::from(10u64).pow(U256::from(18u64))
	);
	assert_eq!(client.get_gas_price().await.unwrap(), 1_000_000_000u128);
}

#[tokio::test]
async fn test_transport_failure_is_transient() {
	let mut transport = MockEVMTransportClient::new();
	transport
		.expect_send_raw_request()
		.with(predicate::eq("eth_blockNumber"), predicate::always())
		.times(1)
		.returning(|_, _| {
			Err(surge_monitor::services::blockchain::TransportError::Network(
				"connection reset".to_string(),
			))
		});

	let client = EvmClient::new_with_transport(transport);
	let error = client.get_latest_block_number().await.unwrap_err();

	assert!(error.is_transient());
}

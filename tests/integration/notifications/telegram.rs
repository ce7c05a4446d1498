use alloy::primitives::{Address, B256};
use mockito::Matcher;
use std::time::Duration;

use surge_monitor::{
	models::TelegramSettings,
	services::notification::{AlertPayload, NotificationError, Notifier, TelegramNotifier},
};

fn settings(chat_ids: &[&str]) -> TelegramSettings {
	TelegramSettings {
		token: "test_token".to_string(),
		chat_ids: chat_ids.iter().map(|id| id.to_string()).collect(),
		disable_web_preview: true,
	}
}

fn payload() -> AlertPayload {
	AlertPayload {
		block_number: 8_381_002,
		asset: Address::repeat_byte(0xaa),
		match_count: 11,
		min_match_count: 10,
		total_volume: "550".to_string(),
		min_volume: "500".to_string(),
		tx_hashes: vec![B256::repeat_byte(0x01), B256::repeat_byte(0x02)],
		explorer_url: "https://www.storyscan.io".to_string(),
		purchase: None,
	}
}

fn chat_query(chat_id: &str) -> Matcher {
	Matcher::AllOf(vec![
		Matcher::UrlEncoded("chat_id".into(), chat_id.into()),
		Matcher::UrlEncoded("parse_mode".into(), "Markdown".into()),
		Matcher::UrlEncoded("disable_web_page_preview".into(), "true".into()),
		Matcher::Regex("text=.*8381002".into()),
	])
}

#[tokio::test]
async fn test_telegram_notification_success() {
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", "/bottest_token/sendMessage")
		.match_query(chat_query("1001"))
		.with_status(200)
		.with_body(r#"{"ok": true, "result": {}}"#)
		.expect(1)
		.create_async()
		.await;

	let notifier = TelegramNotifier::new(Some(server.url()), &settings(&["1001"])).unwrap();
	let result = notifier.notify(&payload()).await;

	assert!(result.is_ok());
	mock.assert_async().await;
}

#[tokio::test]
async fn test_failing_chat_does_not_stop_the_others() {
	let mut server = mockito::Server::new_async().await;
	let rejected = server
		.mock("GET", "/bottest_token/sendMessage")
		.match_query(chat_query("1001"))
		.with_status(400)
		.with_body(r#"{"ok": false, "description": "chat not found"}"#)
		.expect(1)
		.create_async()
		.await;
	let accepted = server
		.mock("GET", "/bottest_token/sendMessage")
		.match_query(chat_query("1002"))
		.with_status(200)
		.with_body(r#"{"ok": true, "result": {}}"#)
		.expect(1)
		.create_async()
		.await;

	let notifier = TelegramNotifier::new(Some(server.url()), &settings(&["1001", "1002"]))
		.unwrap()
		.with_send_interval(Duration::ZERO);
	let result = notifier.notify(&payload()).await;

	assert!(result.is_ok());
	rejected.assert_async().await;
	accepted.assert_async().await;
}

#[tokio::test]
async fn test_telegram_notification_failure() {
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", "/bottest_token/sendMessage")
		.match_query(Matcher::Any)
		.with_status(403)
		.with_body(r#"{"ok": false, "description": "bot was blocked"}"#)
		.expect(2)
		.create_async()
		.await;

	let notifier = TelegramNotifier::new(Some(server.url()), &settings(&["1001", "1002"]))
		.unwrap()
		.with_send_interval(Duration::ZERO);
	let result = notifier.notify(&payload()).await;

	assert!(matches!(result, Err(NotificationError::NetworkError(_))));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_no_chats_is_a_no_op() {
	let notifier = TelegramNotifier::new(
		Some("http://127.0.0.1:9".to_string()),
		&settings(&[]),
	)
	.unwrap();

	assert!(notifier.notify(&payload()).await.is_ok());
}

#[tokio::test]
async fn test_failed_purchase_is_sent_with_escaped_markdown() {
	let payload = payload().with_purchase("failed (no_liquidity): zero quote for TKN_V2");
	let text = payload.to_markdown();
	assert!(text.contains("failed (no\\_liquidity): zero quote for TKN\\_V2"));

	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("GET", "/bottest_token/sendMessage")
		.match_query(Matcher::AllOf(vec![
			chat_query("1001"),
			Matcher::UrlEncoded("text".into(), text),
		]))
		.with_status(200)
		.with_body(r#"{"ok": true, "result": {}}"#)
		.expect(1)
		.create_async()
		.await;

	let notifier = TelegramNotifier::new(Some(server.url()), &settings(&["1001"])).unwrap();

	assert!(notifier.notify(&payload).await.is_ok());
	mock.assert_async().await;
}

//! Alert payload derived from a trigger event.

use alloy::primitives::{utils::format_units, Address, TxHash, U256};
use serde::Serialize;

use crate::models::TriggerEvent;

/// Tx hash lists longer than this are truncated
const TX_LIST_LIMIT: usize = 1000;
const TX_LIST_TRUNCATED_LEN: usize = 900;
const SHORT_HEX_LEN: usize = 10;

/// Everything a notifier needs to describe one trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertPayload {
	pub block_number: u64,
	pub asset: Address,
	pub match_count: u64,
	pub min_match_count: u64,
	/// Reference volume in whole units
	pub total_volume: String,
	pub min_volume: String,
	pub tx_hashes: Vec<TxHash>,
	pub explorer_url: String,
	/// One-line outcome of the purchase attempted for this trigger
	pub purchase: Option<String>,
}

/// Escapes text for Telegram's legacy Markdown so dynamic values cannot open an entity
pub fn escape_markdown(text: &str) -> String {
	const SPECIAL: &[char] = &['_', '*', '`', '['];

	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		if SPECIAL.contains(&c) {
			out.push('\\');
		}
		out.push(c);
	}
	out
}

fn format_amount(amount: U256, decimals: u8) -> String {
	format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}

fn short(hex: &str) -> &str {
	hex.get(..SHORT_HEX_LEN).unwrap_or(hex)
}

impl AlertPayload {
	pub fn from_event(event: &TriggerEvent, explorer_url: &str) -> Self {
		Self {
			block_number: event.block_number,
			asset: event.record.asset,
			match_count: event.record.match_count,
			min_match_count: event.policy.min_match_count,
			total_volume: format_amount(
				event.record.total_reference_volume,
				event.reference_decimals,
			),
			min_volume: format_amount(event.policy.min_volume, event.reference_decimals),
			tx_hashes: event.record.tx_hashes(),
			explorer_url: explorer_url.trim_end_matches('/').to_string(),
			purchase: None,
		}
	}

	pub fn with_purchase(mut self, summary: impl Into<String>) -> Self {
		self.purchase = Some(summary.into());
		self
	}

	/// Markdown list of transaction links, truncated for the Bot API message limit
	pub fn tx_links(&self) -> String {
		let links = self
			.tx_hashes
			.iter()
			.map(|hash| {
				let hash = hash.to_string();
				format!(" - [{}...]({}/tx/{})", short(&hash), self.explorer_url, hash)
			})
			.collect::<Vec<_>>()
			.join("\n");

		if links.chars().count() > TX_LIST_LIMIT {
			let mut truncated: String = links.chars().take(TX_LIST_TRUNCATED_LEN).collect();
			truncated.push_str("\n... (truncated)");
			truncated
		} else {
			links
		}
	}

	/// Renders the alert as Telegram Markdown
	pub fn to_markdown(&self) -> String {
		let asset = self.asset.to_string();
		let mut message = format!(
			"*Trading conditions met*\n\n\
			 *Block:* {}\n\
			 *Matching transactions:* {} (>= {})\n\
			 *Reference volume:* {} (>= {})\n\n\
			 *Asset:* [{}...]({}/address/{})\n\n\
			 *Transactions:*\n{}\n",
			self.block_number,
			self.match_count,
			self.min_match_count,
			escape_markdown(&self.total_volume),
			escape_markdown(&self.min_volume),
			short(&asset),
			self.explorer_url,
			asset,
			self.tx_links(),
		);

		if let Some(purchase) = &self.purchase {
			message.push_str(&format!("\n*Purchase:* {}\n", escape_markdown(purchase)));
		}
		message.push_str(&format!(
			"\n[View block]({}/block/{})",
			self.explorer_url, self.block_number
		));
		message
	}
}

//! Purchase execution against a Uniswap V3 style router.
//!
//! A purchase validates its input, checks the wallet balance, reads the target token's
//! metadata, quotes, approves the router when funding is ERC-20, then signs a legacy
//! transaction locally and waits for its receipt.

use alloy::{
	eips::eip2718::Encodable2718,
	network::{Ethereum, EthereumWallet, TransactionBuilder},
	primitives::{
		aliases::{U160, U24},
		utils::{parse_units, ParseUnits},
		Address, Bytes, TxHash, U256,
	},
	rpc::types::TransactionRequest,
	signers::local::PrivateKeySigner,
	sol_types::SolCall,
};
use async_trait::async_trait;
use backon::Retryable;
use std::{
	str::FromStr,
	sync::atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

use crate::{
	models::{
		EVMReceipt, FailureKind, IQuoter, ISwapRouter, PurchaseOptions, PurchaseRequest,
		PurchaseSuccess, ReferenceFunding, SwapRoute, TokenMetadata, TradeSettings,
		SUPPORTED_FEE_TIERS, IERC20,
	},
	services::{
		blockchain::{BlockChainError, EvmClientTrait},
		filter::encode_path,
		trade::{
			classify::classify_blockchain_error,
			error::{PurchaseResult, TradeError},
		},
	},
	utils::{metrics::record_purchase, retry},
};

const BPS_DENOMINATOR: u64 = 10_000;
const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Buys assets with the reference token
#[async_trait]
pub trait TradeExecutorTrait: Send + Sync {
	async fn purchase(&self, request: &PurchaseRequest, options: &PurchaseOptions)
		-> PurchaseResult;
}

/// Parses a positive amount of whole units into the smallest unit
pub fn parse_amount(amount: &str, decimals: u8) -> Option<U256> {
	match parse_units(amount.trim(), decimals).ok()? {
		ParseUnits::U256(value) if !value.is_zero() => Some(value),
		_ => None,
	}
}

/// Minimum acceptable output for `quoted` under `max_slippage_bps`
///
/// `None` disables the guard and yields zero.
pub fn min_amount_out(quoted: U256, max_slippage_bps: Option<u16>) -> U256 {
	match max_slippage_bps {
		Some(bps) => {
			let kept = BPS_DENOMINATOR.saturating_sub(u64::from(bps));
			quoted.saturating_mul(U256::from(kept)) / U256::from(BPS_DENOMINATOR)
		}
		None => U256::ZERO,
	}
}

/// Parses a hex private key held in zeroizing memory
pub fn signer_from_key(key: &Zeroizing<String>) -> Result<PrivateKeySigner, TradeError> {
	PrivateKeySigner::from_str(key.trim())
		.map_err(|e| TradeError::invalid_input(format!("invalid signing key: {}", e)))
}

fn chain_error(context: &str, error: BlockChainError) -> TradeError {
	TradeError::new(
		classify_blockchain_error(&error),
		format!("{}: {}", context, error),
	)
}

/// Executes purchases through the configured router
pub struct TradeExecutor<C> {
	client: C,
	settings: TradeSettings,
	reference_token: Address,
	reference_decimals: u8,
	signer: Option<(Address, EthereumWallet)>,
	chain_id: Option<u64>,
	approval_confirmed: AtomicBool,
}

impl<C: EvmClientTrait> TradeExecutor<C> {
	pub fn new(
		client: C,
		settings: TradeSettings,
		reference_token: Address,
		reference_decimals: u8,
	) -> Self {
		Self {
			client,
			settings,
			reference_token,
			reference_decimals,
			signer: None,
			chain_id: None,
			approval_confirmed: AtomicBool::new(false),
		}
	}

	/// Attaches the local signing key used for approvals and swaps
	pub fn with_signer(mut self, signer: PrivateKeySigner) -> Self {
		self.signer = Some((signer.address(), EthereumWallet::from(signer)));
		self
	}

	/// Pins the chain id instead of asking the node for it
	pub fn with_chain_id(mut self, chain_id: Option<u64>) -> Self {
		self.chain_id = chain_id;
		self
	}

	/// Address of the trading wallet, if a signing key is attached
	pub fn account(&self) -> Option<Address> {
		self.signer.as_ref().map(|(address, _)| *address)
	}

	pub fn reference_decimals(&self) -> u8 {
		self.reference_decimals
	}

	async fn call_contract<T: SolCall>(
		&self,
		to: Address,
		call: &T,
	) -> Result<T::Return, BlockChainError> {
		let output = self
			.client
			.call(to, Bytes::from(call.abi_encode()))
			.await?;
		T::abi_decode_returns(&output).map_err(|e| {
			BlockChainError::request_error(format!(
				"Failed to decode {} output: {}",
				T::SIGNATURE,
				e
			))
		})
	}

	async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, BlockChainError> {
		self.call_contract(token, &IERC20::balanceOfCall { account: owner })
			.await
	}

	async fn reference_balance(&self, owner: Address) -> Result<U256, TradeError> {
		let balance = match self.settings.funding {
			ReferenceFunding::Native => self.client.get_balance(owner).await,
			ReferenceFunding::Erc20 => self.token_balance(self.reference_token, owner).await,
		};
		balance.map_err(|e| chain_error("failed to read reference balance", e))
	}

	async fn allowance(&self, owner: Address) -> Result<U256, TradeError> {
		self.call_contract(
			self.reference_token,
			&IERC20::allowanceCall {
				owner,
				spender: self.settings.router,
			},
		)
		.await
		.map_err(|e| chain_error("failed to read allowance", e))
	}

	async fn metadata(&self, asset: Address) -> Result<TokenMetadata, TradeError> {
		let decimals = self
			.call_contract(asset, &IERC20::decimalsCall {})
			.await
			.map_err(|e| {
				TradeError::new(
					FailureKind::MetadataUnavailable,
					format!("failed to read decimals of {}: {}", asset, e),
				)
			})?;

		let symbol = match self.call_contract(asset, &IERC20::symbolCall {}).await {
			Ok(symbol) => symbol,
			Err(e) => {
				debug!("symbol of {} unavailable: {}", asset, e);
				UNKNOWN_SYMBOL.to_string()
			}
		};

		Ok(TokenMetadata { decimals, symbol })
	}

	async fn quote(&self, asset: Address, fee: u32, amount: U256) -> Result<U256, TradeError> {
		let quoted = self
			.call_contract(
				self.settings.quoter,
				&IQuoter::quoteExactInputSingleCall {
					tokenIn: self.reference_token,
					tokenOut: asset,
					fee: U24::from(fee),
					amountIn: amount,
					sqrtPriceLimitX96: U160::ZERO,
				},
			)
			.await
			.map_err(|e| {
				TradeError::new(
					FailureKind::NoLiquidity,
					format!("quote failed for {} at fee {}: {}", asset, fee, e),
				)
			})?;

		if quoted.is_zero() {
			return Err(TradeError::new(
				FailureKind::NoLiquidity,
				format!("zero quote for {} at fee {}", asset, fee),
			));
		}
		Ok(quoted)
	}

	/// Estimated gas scaled by the configured multiplier, or `fallback` on failure
	async fn gas_limit(&self, request: &TransactionRequest, fallback: u64) -> u64 {
		match self.client.estimate_gas(request).await {
			Ok(estimate) => estimate.saturating_mul(self.settings.gas_multiplier),
			Err(e) => {
				warn!(
					"gas estimation failed, using default limit {}: {}",
					fallback, e
				);
				fallback
			}
		}
	}

	/// Signs a legacy transaction with the pending nonce and broadcasts it
	async fn send_transaction(
		&self,
		wallet: &EthereumWallet,
		request: TransactionRequest,
		gas_limit: u64,
	) -> Result<TxHash, TradeError> {
		let from = request.from.unwrap_or_default();
		let gas_price = self
			.client
			.get_gas_price()
			.await
			.map_err(|e| chain_error("failed to read gas price", e))?;
		let nonce = self
			.client
			.get_transaction_count(from)
			.await
			.map_err(|e| chain_error("failed to read nonce", e))?;
		let chain_id = match self.chain_id {
			Some(chain_id) => chain_id,
			None => self
				.client
				.get_chain_id()
				.await
				.map_err(|e| chain_error("failed to read chain id", e))?,
		};

		let request = request
			.with_nonce(nonce)
			.with_chain_id(chain_id)
			.with_gas_limit(gas_limit)
			.with_gas_price(gas_price);

		let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(request, wallet)
			.await
			.map_err(|e| {
				TradeError::new(
					FailureKind::UnclassifiedExecutionError,
					format!("failed to sign transaction: {}", e),
				)
			})?;

		self.client
			.send_raw_transaction(Bytes::from(envelope.encoded_2718()))
			.await
			.map_err(|e| chain_error("failed to send transaction", e))
	}

	/// Polls for the receipt of `tx_hash` with the configured attempts and interval
	async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<EVMReceipt, TradeError> {
		let confirmation = &self.settings.confirmation;
		let client = &self.client;

		let receipt = (|| async move {
			match client.get_transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => Ok(receipt),
				Ok(None) => Err(format!("{} is still pending", tx_hash)),
				Err(e) => Err(e.to_string()),
			}
		})
		.retry(retry::polling(
			confirmation.max_attempts,
			confirmation.interval(),
		))
		.await
		.map_err(|last| {
			TradeError::new(
				FailureKind::ConfirmationTimeout,
				format!(
					"no receipt for {} after {} attempts: {}",
					tx_hash, confirmation.max_attempts, last
				),
			)
		})?;

		if !receipt.succeeded() {
			return Err(TradeError::new(
				FailureKind::ExecutionReverted,
				format!("transaction {} reverted", tx_hash),
			));
		}
		Ok(receipt)
	}

	/// Approves the router for the reference token when the current allowance is short
	///
	/// Only a confirmed unlimited approval sent by this executor is remembered.
	async fn ensure_allowance(
		&self,
		wallet: &EthereumWallet,
		account: Address,
		amount: U256,
	) -> Result<(), TradeError> {
		if self.settings.funding != ReferenceFunding::Erc20
			|| self.approval_confirmed.load(Ordering::Acquire)
		{
			return Ok(());
		}

		// Finite allowances are re-read on every purchase
		if self.allowance(account).await? >= amount {
			return Ok(());
		}

		let request = TransactionRequest::default()
			.with_from(account)
			.with_to(self.reference_token)
			.with_input(
				IERC20::approveCall {
					spender: self.settings.router,
					amount: U256::MAX,
				}
				.abi_encode(),
			);
		let gas_limit = self
			.gas_limit(&request, self.settings.approve_gas_limit)
			.await;

		let tx_hash = self.send_transaction(wallet, request, gas_limit).await?;
		info!("approval sent: {}", tx_hash);

		self.wait_for_receipt(tx_hash).await?;
		self.approval_confirmed.store(true, Ordering::Release);
		info!("approval confirmed: {}", tx_hash);
		Ok(())
	}

	fn swap_calldata(
		&self,
		asset: Address,
		fee: u32,
		recipient: Address,
		amount: U256,
		min_out: U256,
	) -> Vec<u8> {
		let deadline = U256::from(
			(chrono::Utc::now().timestamp().max(0) as u64).saturating_add(self.settings.deadline_secs),
		);

		match self.settings.route {
			SwapRoute::ExactInputSingle => ISwapRouter::exactInputSingleCall {
				params: ISwapRouter::ExactInputSingleParams {
					tokenIn: self.reference_token,
					tokenOut: asset,
					fee: U24::from(fee),
					recipient,
					deadline,
					amountIn: amount,
					amountOutMinimum: min_out,
					sqrtPriceLimitX96: U160::ZERO,
				},
			}
			.abi_encode(),
			SwapRoute::ExactInput => ISwapRouter::exactInputCall {
				params: ISwapRouter::ExactInputParams {
					path: encode_path(self.reference_token, &[(fee, asset)]),
					recipient,
					deadline,
					amountIn: amount,
					amountOutMinimum: min_out,
				},
			}
			.abi_encode(),
		}
	}

	async fn execute(
		&self,
		request: &PurchaseRequest,
		options: &PurchaseOptions,
	) -> PurchaseResult {
		let asset = Address::from_str(request.asset_address.trim()).map_err(|e| {
			TradeError::invalid_input(format!(
				"invalid asset address {:?}: {}",
				request.asset_address, e
			))
		})?;
		let amount = parse_amount(&request.budget_amount, self.reference_decimals).ok_or_else(
			|| {
				TradeError::invalid_input(format!(
					"budget must be a positive amount, got {:?}",
					request.budget_amount
				))
			},
		)?;
		let fee = options.fee_tier.unwrap_or(self.settings.fee_tier);
		if !SUPPORTED_FEE_TIERS.contains(&fee) {
			return Err(TradeError::invalid_input(format!(
				"unsupported fee tier {}",
				fee
			)));
		}
		if self.signer.is_none() && !options.dry_run {
			return Err(TradeError::invalid_input(
				"no signing key configured for a live purchase",
			));
		}

		if let Some(account) = self.account() {
			let balance = self.reference_balance(account).await?;
			if balance < amount {
				return Err(TradeError::new(
					FailureKind::InsufficientFunds,
					format!("balance {} is below the budget {}", balance, amount),
				));
			}
		}

		let metadata = self.metadata(asset).await?;
		let quoted = self.quote(asset, fee, amount).await?;
		info!(
			"quoted {} {} for {} reference units",
			quoted, metadata.symbol, request.budget_amount
		);

		let Some((account, wallet)) = self.signer.as_ref().filter(|_| !options.dry_run) else {
			let needs_approval = match (self.settings.funding, self.account()) {
				(ReferenceFunding::Native, _) => false,
				(ReferenceFunding::Erc20, Some(account)) => {
					!self.approval_confirmed.load(Ordering::Acquire)
						&& self.allowance(account).await? < amount
				}
				(ReferenceFunding::Erc20, None) => true,
			};
			return Ok(PurchaseSuccess::Simulated {
				asset,
				symbol: metadata.symbol,
				quoted_amount: quoted,
				needs_approval,
			});
		};
		let account = *account;

		self.ensure_allowance(wallet, account, amount).await?;

		let balance_before = self
			.token_balance(asset, account)
			.await
			.map_err(|e| chain_error("failed to read target balance", e))?;

		let min_out = min_amount_out(quoted, self.settings.max_slippage_bps);
		let value = match self.settings.funding {
			ReferenceFunding::Native => amount,
			ReferenceFunding::Erc20 => U256::ZERO,
		};
		let swap = TransactionRequest::default()
			.with_from(account)
			.with_to(self.settings.router)
			.with_input(self.swap_calldata(asset, fee, account, amount, min_out))
			.with_value(value);
		let gas_limit = self.gas_limit(&swap, self.settings.default_gas_limit).await;

		let tx_hash = self.send_transaction(wallet, swap, gas_limit).await?;
		info!("swap sent: {}", tx_hash);

		let receipt = self.wait_for_receipt(tx_hash).await?;

		let received_amount = match self.token_balance(asset, account).await {
			Ok(balance_after) => balance_after.saturating_sub(balance_before),
			Err(e) => {
				warn!("failed to read target balance after swap: {}", e);
				U256::ZERO
			}
		};

		Ok(PurchaseSuccess::Executed {
			asset,
			symbol: metadata.symbol,
			tx_hash,
			block_number: receipt.block_number(),
			gas_used: receipt.gas_used(),
			received_amount,
			quoted_amount: quoted,
		})
	}
}

#[async_trait]
impl<C: EvmClientTrait> TradeExecutorTrait for TradeExecutor<C> {
	#[instrument(skip_all, fields(asset = %request.asset_address, dry_run = options.dry_run))]
	async fn purchase(
		&self,
		request: &PurchaseRequest,
		options: &PurchaseOptions,
	) -> PurchaseResult {
		let result = self.execute(request, options).await;

		match &result {
			Ok(success) => {
				info!("purchase {}: {:?}", success.outcome(), success);
				record_purchase(success.outcome());
			}
			Err(e) => {
				warn!("purchase failed: {}", e);
				record_purchase(e.kind.as_str());
			}
		}
		result
	}
}

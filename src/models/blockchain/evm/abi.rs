//! Contract interfaces used for calldata decoding, quoting and trading.

use alloy::sol;

sol! {
	interface IERC20 {
		event Transfer(address indexed from, address indexed to, uint256 value);

		function decimals() external view returns (uint8);
		function symbol() external view returns (string);
		function balanceOf(address account) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
	}

	interface ISwapRouter {
		struct ExactInputSingleParams {
			address tokenIn;
			address tokenOut;
			uint24 fee;
			address recipient;
			uint256 deadline;
			uint256 amountIn;
			uint256 amountOutMinimum;
			uint160 sqrtPriceLimitX96;
		}

		struct ExactInputParams {
			bytes path;
			address recipient;
			uint256 deadline;
			uint256 amountIn;
			uint256 amountOutMinimum;
		}

		function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
		function exactInput(ExactInputParams calldata params) external payable returns (uint256 amountOut);
	}

	interface IQuoter {
		function quoteExactInputSingle(
			address tokenIn,
			address tokenOut,
			uint24 fee,
			uint256 amountIn,
			uint160 sqrtPriceLimitX96
		) external returns (uint256 amountOut);
	}
}

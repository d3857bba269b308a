//! Solidity surface of the sale precompile.

use alloy_sol_types::sol;

sol! {
    /// MomoCandie sale interface.
    interface IMomoCandie {
        /// Whitelisted mint; `msg.value` must cover `quantity * presalePrice`.
        function presaleMint(uint256 quantity, bytes32[] proof) external payable;

        /// Open mint; `msg.value` must cover `quantity * publicPrice`.
        function publicMint(uint256 quantity) external payable;

        /// Owner-only free mint from the reserve.
        function reserveMint(address to, uint256 quantity) external;

        function openPresale() external;
        function toggleSale() external;
        function closeSale() external;

        function setMerkleRoot(bytes32 newRoot) external;
        function setPrices(uint256 presalePrice, uint256 publicPrice) external;
        function reveal(string baseURI) external;
        function handoffToDAO() external;

        /// Sends the whole contract balance to the caller.
        function withdraw() external;

        /// Sends the whole contract balance to the DAO multisig.
        function withdrawToDAO() external;

        function MAX_SUPPLY() external view returns (uint256);
        function RESERVE_SUPPLY() external view returns (uint256);
        function MAX_PER_WALLET() external view returns (uint256);
        function MAX_PRESALE_MINT() external view returns (uint256);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function salePhase() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function remainingSupply() external view returns (uint256);
        function revealed() external view returns (bool);
        function unrevealedURI() external view returns (string);
        function merkleRoot() external view returns (bytes32);
        function presalePrice() external view returns (uint256);
        function publicPrice() external view returns (uint256);
        function presaleMintedCount(address account) external view returns (uint256);
        function publicMintedCount(address account) external view returns (uint256);
        function reserveMinted() external view returns (uint256);
        function owner() external view returns (address);
        function daoMultisig() external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string);
        function balanceOf(address holder) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}

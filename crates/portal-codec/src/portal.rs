use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::input::TokenStandard;

pub const ETHER_PORTAL: Address = address!("Ffdbe43d4c855BF7e0f105c400A50857f53AB044");
pub const ERC20_PORTAL: Address = address!("9C21AEb2093C32DDbC53eEF24B873BDCd1aDa1DB");
pub const ERC721_PORTAL: Address = address!("237F8DD094C0e47f4236f12b4Fa01d6Dae89fb87");
pub const ERC1155_SINGLE_PORTAL: Address = address!("7CFB0193Ca87eB6e48056885E026552c3A941FC4");
pub const ERC1155_BATCH_PORTAL: Address = address!("edB53860A6B52bbb7561Ad596416ee9965B055Aa");

/// Addresses of the trusted deposit contracts, one per token standard.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Portals {
    pub ether: Address,
    pub erc20: Address,
    pub erc721: Address,
    pub erc1155_single: Address,
    pub erc1155_batch: Address,
}

impl Default for Portals {
    fn default() -> Self {
        Self {
            ether: ETHER_PORTAL,
            erc20: ERC20_PORTAL,
            erc721: ERC721_PORTAL,
            erc1155_single: ERC1155_SINGLE_PORTAL,
            erc1155_batch: ERC1155_BATCH_PORTAL,
        }
    }
}

impl Portals {
    /// The token standard whose deposits `sender` relays, if it is a portal.
    pub fn standard_of(&self, sender: &Address) -> Option<TokenStandard> {
        match *sender {
            s if s == self.ether => Some(TokenStandard::Ether),
            s if s == self.erc20 => Some(TokenStandard::Erc20),
            s if s == self.erc721 => Some(TokenStandard::Erc721),
            s if s == self.erc1155_single => Some(TokenStandard::Erc1155Single),
            s if s == self.erc1155_batch => Some(TokenStandard::Erc1155Batch),
            _ => None,
        }
    }

    pub fn address_of(&self, standard: TokenStandard) -> Address {
        match standard {
            TokenStandard::Ether => self.ether,
            TokenStandard::Erc20 => self.erc20,
            TokenStandard::Erc721 => self.erc721,
            TokenStandard::Erc1155Single => self.erc1155_single,
            TokenStandard::Erc1155Batch => self.erc1155_batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_portal_maps_back_to_its_standard() {
        let portals = Portals::default();
        for standard in TokenStandard::ALL {
            assert_eq!(
                portals.standard_of(&portals.address_of(standard)),
                Some(standard)
            );
        }
        assert_eq!(portals.standard_of(&Address::repeat_byte(0x11)), None);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let portals: Portals =
            serde_json::from_str(r#"{"ether":"0x1111111111111111111111111111111111111111"}"#)
                .unwrap();
        assert_eq!(portals.ether, Address::repeat_byte(0x11));
        assert_eq!(portals.erc20, ERC20_PORTAL);
    }
}

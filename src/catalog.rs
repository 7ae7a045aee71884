use ethers_core::types::{Address, H256};

use crate::config::ConfigError;

/// A category of reimbursable transactions: logs emitted by any of
/// `addresses` whose topics match `topics` position by position.
///
/// An empty set at a position matches any topic there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGroup {
    pub label: &'static str,
    pub addresses: Vec<Address>,
    pub topics: Vec<Vec<H256>>,
}

struct GroupDef {
    label: &'static str,
    addresses: &'static [&'static str],
    topics: &'static [&'static [&'static str]],
}

const PROJECT_ID_1: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

const GROUPS: &[GroupDef] = &[
    GroupDef {
        label: "Execute multisig tx",
        addresses: &["0xAF28bcB48C40dBC86f52D459A6562F658fc94B1e"],
        topics: &[
            // ExecutionSuccess
            &["0x442e715f626346e8c54381002da614f62bee8d27386535b2521ec8540898556e"],
        ],
    },
    GroupDef {
        label: "Distribute JuiceboxDAO payouts",
        addresses: &[
            "0xFA391De95Fcbcd3157268B91d8c7af083E607A5C", // JBETHPaymentTerminal3_1
            "0x457cD63bee88ac01f3cD4a67D5DCc921D8C0D573", // JBETHPaymentTerminal3_1_1
            "0x1d9619E10086FdC1065B114298384aAe3F680CC0", // JBETHPaymentTerminal3_1_2
        ],
        topics: &[
            // DistributePayouts
            &["0xc41a8d26c70cfcf1b9ea10f82482ac947b8be5bea2750bc729af844bbfde1e28"],
            &[],
            &[],
            &[PROJECT_ID_1],
        ],
    },
    GroupDef {
        label: "Distribute JuiceboxDAO reserved tokens",
        addresses: &[
            "0xFFdD70C318915879d5192e8a0dcbFcB0285b3C98", // JBController
            "0xA139D37275d1fF7275e6F33821898934Bc8Cb7B6", // JBController3_0_1
            "0x97a5b9D9F0F7cD676B69f584F29048D0Ef4BB59b", // JBController3_1
        ],
        topics: &[
            // DistributeReservedTokens
            &["0xb12d7a78048433f69fe6d30145bf08aad8e82985b96e4db6d5c6a7e94d57086e"],
            &[],
            &[],
            &[PROJECT_ID_1],
        ],
    },
];

/// The reimbursable event groups, in the order they are queried.
pub fn event_groups() -> Result<Vec<EventGroup>, ConfigError> {
    GROUPS.iter().map(GroupDef::parse).collect()
}

impl GroupDef {
    fn parse(&self) -> Result<EventGroup, ConfigError> {
        let label = self.label;
        let malformed = |value: &'static str| ConfigError::Catalog { group: label, value };

        let addresses = self
            .addresses
            .iter()
            .map(|&raw| raw.parse::<Address>().map_err(|_| malformed(raw)))
            .collect::<Result<Vec<_>, _>>()?;

        let topics = self
            .topics
            .iter()
            .map(|position| {
                position
                    .iter()
                    .map(|&raw| raw.parse::<H256>().map_err(|_| malformed(raw)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EventGroup {
            label,
            addresses,
            topics,
        })
    }
}

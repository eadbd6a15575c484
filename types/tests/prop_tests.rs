use bigdecimal::Zero;
use proptest::prelude::*;

use stakesync_types::{sum_amounts, Amount, RewardRateValues, StakingNetwork};

fn arb_network() -> impl Strategy<Value = StakingNetwork> {
    prop_oneof![
        Just(StakingNetwork::Solana),
        Just(StakingNetwork::Cosmos),
        Just(StakingNetwork::Tron),
        Just(StakingNetwork::Ethereum),
        Just(StakingNetwork::Bsc),
        Just(StakingNetwork::Ton),
        Just(StakingNetwork::Polkadot),
        Just(StakingNetwork::Kusama),
        Just(StakingNetwork::Kava),
        Just(StakingNetwork::Near),
        Just(StakingNetwork::Cardano),
        Just(StakingNetwork::Avalanche),
    ]
}

proptest! {
    /// Every network is recovered from its provider id.
    #[test]
    fn provider_id_identifies_network(network in arb_network()) {
        prop_assert_eq!(StakingNetwork::from_provider_id(network.provider_id()), Some(network));
        prop_assert_eq!(network.to_string().parse::<StakingNetwork>().unwrap(), network);
    }

    /// Summing amounts matches integer addition and starts at zero.
    #[test]
    fn sum_matches_integer_sum(values in prop::collection::vec(-1_000_000i64..1_000_000, 0..20)) {
        let amounts: Vec<Amount> = values.iter().copied().map(Amount::from).collect();
        let expected: i64 = values.iter().sum();
        prop_assert_eq!(sum_amounts(&amounts), Amount::from(expected));
        if values.is_empty() {
            prop_assert!(sum_amounts(&amounts).is_zero());
        }
    }

    /// Reward rates collapse to a single value exactly when all rates agree.
    #[test]
    fn reward_rate_interval_bounds(rates in prop::collection::vec(0i64..100, 1..10)) {
        let amounts: Vec<Amount> = rates.iter().copied().map(Amount::from).collect();
        let min = *rates.iter().min().unwrap();
        let max = *rates.iter().max().unwrap();

        match RewardRateValues::new(&amounts, Amount::zero()) {
            RewardRateValues::Single(value) => {
                prop_assert_eq!(min, max);
                prop_assert_eq!(value, Amount::from(min));
            }
            RewardRateValues::Interval { min: lo, max: hi } => {
                prop_assert!(min < max);
                prop_assert_eq!(lo, Amount::from(min));
                prop_assert_eq!(hi, Amount::from(max));
            }
        }
    }
}

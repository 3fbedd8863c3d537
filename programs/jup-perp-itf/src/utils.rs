use anchor_lang::prelude::Pubkey;

use crate::{RequestChange, Side};

pub mod seeds {
    pub const POSITION: &[u8] = b"position";
    pub const POSITION_REQUEST: &[u8] = b"position_request";
    pub const EVENT_AUTHORITY: &[u8] = b"__event_authority";
}

pub fn get_position_pk(
    owner: &Pubkey,
    pool: &Pubkey,
    custody: &Pubkey,
    collateral_custody: &Pubkey,
    side: Side,
) -> Result<(Pubkey, u8), Errors> {
    let side = side.seed().ok_or(Errors::InvalidSide)?;
    Ok(Pubkey::find_program_address(
        &[
            seeds::POSITION,
            owner.as_ref(),
            pool.as_ref(),
            custody.as_ref(),
            collateral_custody.as_ref(),
            &[side],
        ],
        &crate::ID,
    ))
}

pub fn get_position_request_pk(
    position_pk: &Pubkey,
    counter: u64,
    request_change: RequestChange,
) -> Result<(Pubkey, u8), Errors> {
    let change = request_change.seed().ok_or(Errors::InvalidRequestChange)?;
    Ok(Pubkey::find_program_address(
        &[
            seeds::POSITION_REQUEST,
            position_pk.as_ref(),
            &counter.to_le_bytes(),
            &[change],
        ],
        &crate::ID,
    ))
}

pub fn get_event_authority_pk() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::EVENT_AUTHORITY], &crate::ID)
}

/// Check a position account against the seeds it claims, using its stored bump
pub fn check_position_pk(
    position: &crate::Position,
    expected_position_pk: &Pubkey,
) -> Result<(), Errors> {
    let side = position.side.seed().ok_or(Errors::InvalidSide)?;
    let position_pk = Pubkey::create_program_address(
        &[
            seeds::POSITION,
            position.owner.as_ref(),
            position.pool.as_ref(),
            position.custody.as_ref(),
            position.collateral_custody.as_ref(),
            &[side],
            &[position.bump],
        ],
        &crate::ID,
    )
    .map_err(|_| Errors::UnableToDerivePDA)?;
    if position_pk != *expected_position_pk {
        Err(Errors::WrongPosition)
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errors {
    /// Unable to derive the position PDA
    UnableToDerivePDA,
    /// The position account is not the expected one
    WrongPosition,
    /// `Side::None` has no position
    InvalidSide,
    /// `RequestChange::None` has no request
    InvalidRequestChange,
}

impl std::fmt::Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Errors::UnableToDerivePDA => "unable to derive the position PDA",
            Errors::WrongPosition => "the position account is not the expected one",
            Errors::InvalidSide => "side must be long or short",
            Errors::InvalidRequestChange => "request change must be increase or decrease",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Errors {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{custodies, JLP_POOL};

    fn pubkey_strategy() -> impl Strategy<Value = Pubkey> {
        any::<[u8; 32]>().prop_map(Pubkey::new_from_array)
    }

    fn side_strategy() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Long), Just(Side::Short)]
    }

    fn change_strategy() -> impl Strategy<Value = RequestChange> {
        prop_oneof![Just(RequestChange::Increase), Just(RequestChange::Decrease)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn position_pk_is_deterministic(
            owner in pubkey_strategy(),
            custody in pubkey_strategy(),
            collateral_custody in pubkey_strategy(),
            side in side_strategy(),
        ) {
            let first = get_position_pk(&owner, &JLP_POOL, &custody, &collateral_custody, side).unwrap();
            let second = get_position_pk(&owner, &JLP_POOL, &custody, &collateral_custody, side).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn position_request_pk_is_deterministic(
            position in pubkey_strategy(),
            counter in any::<u64>(),
            change in change_strategy(),
        ) {
            let first = get_position_request_pk(&position, counter, change).unwrap();
            let second = get_position_request_pk(&position, counter, change).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn long_and_short_positions_differ() {
        let owner = Pubkey::new_unique();
        let (long, _) =
            get_position_pk(&owner, &JLP_POOL, &custodies::SOL, &custodies::SOL, Side::Long).unwrap();
        let (short, _) =
            get_position_pk(&owner, &JLP_POOL, &custodies::SOL, &custodies::USDC, Side::Short)
                .unwrap();
        let (short_same_collateral, _) =
            get_position_pk(&owner, &JLP_POOL, &custodies::SOL, &custodies::SOL, Side::Short)
                .unwrap();
        assert_ne!(long, short);
        assert_ne!(long, short_same_collateral);
    }

    #[test]
    fn request_pk_depends_on_counter_and_change() {
        let position = Pubkey::new_unique();
        let (a, _) = get_position_request_pk(&position, 1, RequestChange::Increase).unwrap();
        let (b, _) = get_position_request_pk(&position, 2, RequestChange::Increase).unwrap();
        let (c, _) = get_position_request_pk(&position, 1, RequestChange::Decrease).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn none_variants_are_rejected() {
        let owner = Pubkey::new_unique();
        assert_eq!(
            get_position_pk(&owner, &JLP_POOL, &custodies::SOL, &custodies::SOL, Side::None),
            Err(Errors::InvalidSide)
        );
        assert_eq!(
            get_position_request_pk(&owner, 0, RequestChange::None),
            Err(Errors::InvalidRequestChange)
        );
    }

    #[test]
    fn check_position_pk_uses_stored_bump() {
        let owner = Pubkey::new_unique();
        let (position_pk, bump) =
            get_position_pk(&owner, &JLP_POOL, &custodies::ETH, &custodies::ETH, Side::Long).unwrap();
        let mut position = crate::Position {
            owner,
            pool: JLP_POOL,
            custody: custodies::ETH,
            collateral_custody: custodies::ETH,
            side: Side::Long,
            bump,
            ..Default::default()
        };
        assert_eq!(check_position_pk(&position, &position_pk), Ok(()));

        position.side = Side::Short;
        assert!(check_position_pk(&position, &position_pk).is_err());
    }

    #[test]
    fn event_authority_is_stable() {
        assert_eq!(get_event_authority_pk(), get_event_authority_pk());
    }
}

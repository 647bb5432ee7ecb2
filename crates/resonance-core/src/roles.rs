use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{CalcError, CalcResult};

/// The three gates. Each has its own denial condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Curator,
    Oracle,
    Keeper,
}

impl Role {
    pub fn denial(self) -> CalcError {
        match self {
            Role::Curator => CalcError::NotCurator,
            Role::Oracle => CalcError::NotOracle,
            Role::Keeper => CalcError::NotKeeper,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Curator => "curator",
            Role::Oracle => "oracle",
            Role::Keeper => "keeper",
        }
    }
}

/// Role identities, fixed at construction. There is no transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    curator: Address,
    oracle: Address,
    keeper: Address,
}

impl Roles {
    /// Rejects a zero identity in any position.
    pub fn new(curator: Address, oracle: Address, keeper: Address) -> CalcResult<Self> {
        let roles = Roles {
            curator,
            oracle,
            keeper,
        };
        roles.validate()?;
        Ok(roles)
    }

    pub(crate) fn validate(&self) -> CalcResult<()> {
        if self.curator.is_zero() || self.oracle.is_zero() || self.keeper.is_zero() {
            return Err(CalcError::ZeroAddress);
        }
        Ok(())
    }

    pub fn curator(&self) -> Address {
        self.curator
    }

    pub fn oracle(&self) -> Address {
        self.oracle
    }

    pub fn keeper(&self) -> Address {
        self.keeper
    }

    pub fn holder(&self, role: Role) -> Address {
        match role {
            Role::Curator => self.curator,
            Role::Oracle => self.oracle,
            Role::Keeper => self.keeper,
        }
    }

    /// Plain identity comparison against the role holder.
    pub fn require(&self, role: Role, caller: Address) -> CalcResult<()> {
        if caller != self.holder(role) {
            return Err(role.denial());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Roles {
        Roles::new(
            Address::from_low_u64(1),
            Address::from_low_u64(2),
            Address::from_low_u64(3),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_identity_rejected() {
        let a = Address::from_low_u64(1);
        assert_eq!(Roles::new(Address::ZERO, a, a), Err(CalcError::ZeroAddress));
        assert_eq!(Roles::new(a, Address::ZERO, a), Err(CalcError::ZeroAddress));
        assert_eq!(Roles::new(a, a, Address::ZERO), Err(CalcError::ZeroAddress));
    }

    #[test]
    fn test_distinct_denials() {
        let r = roles();
        let stranger = Address::from_low_u64(99);
        assert_eq!(r.require(Role::Curator, stranger), Err(CalcError::NotCurator));
        assert_eq!(r.require(Role::Oracle, stranger), Err(CalcError::NotOracle));
        assert_eq!(r.require(Role::Keeper, stranger), Err(CalcError::NotKeeper));
    }

    #[test]
    fn test_holder_passes_only_own_gate() {
        let r = roles();
        assert_eq!(r.require(Role::Curator, r.curator()), Ok(()));
        assert_eq!(r.require(Role::Keeper, r.curator()), Err(CalcError::NotKeeper));
        assert_eq!(r.require(Role::Oracle, r.oracle()), Ok(()));
    }

    #[test]
    fn test_one_identity_may_hold_several_roles() {
        let a = Address::from_low_u64(7);
        let r = Roles::new(a, a, a).unwrap();
        assert!(r.require(Role::Keeper, a).is_ok());
        assert!(r.require(Role::Curator, a).is_ok());
    }
}

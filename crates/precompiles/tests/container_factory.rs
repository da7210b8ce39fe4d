//! Building dispatch tables and containers through the public API.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Selector, address},
};
use modbridge_precompiles::{
    AbiMethods, BridgePrecompileError, CallContext, FactoryError, ImplMethod, PrecompileRegistry,
    Registrable, StatefulImpl,
    dispatch::arg_address,
    factory::build_ids_to_methods,
};
use std::sync::Arc;

const VALIDATOR: Address = address!("0x00000000000000000000000000000000000000f1");

struct Staking {
    abi: AbiMethods,
    with_delegate: bool,
}

impl Staking {
    fn new(with_delegate: bool) -> eyre::Result<Self> {
        Ok(Self {
            abi: AbiMethods::parse([
                "function getValidator(address validator) returns (address operator)",
                "function delegate(address validator, uint256 amount) returns (bool success)",
            ])?,
            with_delegate,
        })
    }
}

impl StatefulImpl for Staking {
    fn registry_key(&self) -> Address {
        address!("0x00000000000000000000000000000000000000a0")
    }

    fn name(&self) -> &'static str {
        "Staking"
    }

    fn abi_methods(&self) -> &AbiMethods {
        &self.abi
    }

    fn precompile_methods(self: Arc<Self>) -> Vec<ImplMethod> {
        let mut methods = vec![
            ImplMethod::new(&self, "GetValidator", "(address)", |_, _, args| {
                Ok(vec![DynSolValue::Address(arg_address(args, 0)?)])
            }),
            ImplMethod::new(&self, "HelperSortAddrs", "(address[])", |_, _, _| {
                Ok(vec![DynSolValue::Array(vec![])])
            }),
        ];
        if self.with_delegate {
            methods.push(ImplMethod::new(&self, "Delegate", "(bool)", |_, _, _| {
                Ok(vec![DynSolValue::Bool(true)])
            }));
        }
        methods
    }
}

#[test]
fn test_helpers_are_left_out_of_the_table() -> eyre::Result<()> {
    let staking = Arc::new(Staking::new(true)?);
    let table = build_ids_to_methods(staking.abi_methods(), staking.clone().precompile_methods())?;

    assert_eq!(table.len(), 2);
    let mut signatures: Vec<_> = table.values().map(|method| method.signature()).collect();
    signatures.sort();
    assert_eq!(signatures, ["delegate(address,uint256)", "getValidator(address)"]);
    Ok(())
}

#[test]
fn test_unknown_selector_is_rejected_by_the_container() -> eyre::Result<()> {
    let staking = Staking::new(true)?;
    let get_validator = staking
        .abi_methods()
        .get("getValidator")
        .map(|method| method.selector())
        .ok_or_else(|| eyre::eyre!("getValidator not declared"))?;
    let container = Registrable::stateful(staking).build()?;
    let ctx = CallContext::new(Address::ZERO);

    let unknown = Selector::from([0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(
        container.invoke(unknown, &ctx, &[]),
        Err(BridgePrecompileError::UnknownMethod(unknown))
    );

    assert!(container.abi_method(&get_validator).is_some());
    assert_eq!(
        container.invoke(get_validator, &ctx, &[DynSolValue::Address(VALIDATOR)])?,
        vec![DynSolValue::Address(VALIDATOR)]
    );
    Ok(())
}

#[test]
fn test_missing_native_method_fails_registration() -> eyre::Result<()> {
    let err = Registrable::stateful(Staking::new(false)?)
        .build()
        .err()
        .ok_or_else(|| eyre::eyre!("build should fail"))?;

    assert_eq!(
        err.root(),
        &FactoryError::NoImplementationForAbiMethod("delegate".into())
    );
    assert_eq!(
        err.root().to_string(),
        "no native implementation for declared ABI method `delegate`"
    );
    Ok(())
}

#[test]
fn test_registry_refuses_a_second_container_at_the_same_address() -> eyre::Result<()> {
    let mut registry = PrecompileRegistry::new();
    registry.register(Registrable::stateful(Staking::new(true)?))?;

    assert_eq!(
        registry.register(Registrable::stateful(Staking::new(true)?)),
        Err(FactoryError::DuplicateRegistryKey(address!(
            "0x00000000000000000000000000000000000000a0"
        )))
    );
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn test_register_all_stops_at_first_failure() -> eyre::Result<()> {
    let mut registry = PrecompileRegistry::new();
    let result = registry.register_all([
        Registrable::stateful(Staking::new(false)?),
        Registrable::stateful(Staking::new(true)?),
    ]);

    assert!(result.is_err());
    assert!(registry.is_empty());
    Ok(())
}

//! # ABI
//!
//! Contract interfaces are the JSON ABI from the build artifact, held as an
//! `alloy-json-abi` [`JsonAbi`]. Call and constructor data are encoded, and
//! return data decoded, by `alloy-dyn-abi`.
//!
//! Arguments are checked against the declared parameters before encoding:
//!
//! | Check | Error |
//! |-------|-------|
//! | argument count | `ArgumentCount` |
//! | value kind matches the parameter type | `ArgumentType` |
//! | integer fits the declared width (`uint8`, `int128`, ...) | `ValueOutOfRange` |
//!
//! A bare method name picks the overload whose parameters accept the given
//! arguments; a full signature such as `transfer(address,uint256)` picks one
//! overload exactly.

use crate::domain::value_objects::{Address, U256};
use crate::errors::InterfaceError;
use alloy_dyn_abi::{FunctionExt, JsonAbiExt, Specifier};
use alloy_primitives::I256;

pub use alloy_dyn_abi::{DynSolType, DynSolValue};
pub use alloy_json_abi::{Constructor, Function, JsonAbi, Param, StateMutability};

/// Argument or return value of a contract call.
pub type AbiValue = DynSolValue;

// =============================================================================
// VALUE CONSTRUCTION
// =============================================================================

impl From<Address> for alloy_primitives::Address {
    fn from(address: Address) -> Self {
        Self::new(address.0)
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(address: alloy_primitives::Address) -> Self {
        Self::new(address.0 .0)
    }
}

impl From<Address> for AbiValue {
    fn from(address: Address) -> Self {
        Self::Address(address.into())
    }
}

/// An unsigned integer argument; its width is taken from the parameter it is
/// passed to.
#[must_use]
pub fn uint(value: impl Into<U256>) -> AbiValue {
    let mut word = [0u8; 32];
    value.into().to_big_endian(&mut word);
    AbiValue::Uint(alloy_primitives::U256::from_be_bytes(word), 256)
}

/// A signed integer argument; its width is taken from the parameter it is
/// passed to.
#[must_use]
pub fn int(value: i128) -> AbiValue {
    let raw = alloy_primitives::U256::from_be_bytes(sign_extend(value));
    AbiValue::Int(I256::from_raw(raw), 256)
}

fn sign_extend(value: i128) -> [u8; 32] {
    let mut word = if value < 0 { [0xff; 32] } else { [0u8; 32] };
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

// =============================================================================
// ARGUMENT CHECKING
// =============================================================================

/// Checks `args` against `params` and fixes each integer to its declared
/// width. `context` names the function in errors.
pub fn coerce_arguments(
    context: &str,
    params: &[Param],
    args: &[AbiValue],
) -> Result<Vec<AbiValue>, InterfaceError> {
    if params.len() != args.len() {
        return Err(InterfaceError::ArgumentCount {
            function: context.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param
                .resolve()
                .map_err(|_| InterfaceError::UnsupportedType(param.ty.clone()))?;
            coerce(&param.name, &ty, arg)
        })
        .collect()
}

fn coerce(param: &str, ty: &DynSolType, value: &AbiValue) -> Result<AbiValue, InterfaceError> {
    let mismatch = || InterfaceError::ArgumentType {
        param: param.to_string(),
        expected: ty.sol_type_name().into_owned(),
    };
    let out_of_range = || InterfaceError::ValueOutOfRange {
        param: param.to_string(),
        expected: ty.sol_type_name().into_owned(),
    };

    match (ty, value) {
        (DynSolType::Uint(bits), DynSolValue::Uint(n, _)) => {
            if n.bit_len() > *bits {
                return Err(out_of_range());
            }
            Ok(DynSolValue::Uint(*n, *bits))
        }
        (DynSolType::Int(bits), DynSolValue::Int(n, _)) => {
            // Every bit above the sign bit must repeat it
            let high = n.asr(bits - 1);
            if high != I256::ZERO && high != I256::MINUS_ONE {
                return Err(out_of_range());
            }
            Ok(DynSolValue::Int(*n, *bits))
        }
        (DynSolType::Array(inner), DynSolValue::Array(items)) => items
            .iter()
            .map(|item| coerce(param, inner, item))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, len), DynSolValue::FixedArray(items))
            if items.len() == *len =>
        {
            items
                .iter()
                .map(|item| coerce(param, inner, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        (DynSolType::Tuple(types), DynSolValue::Tuple(items)) if types.len() == items.len() => {
            types
                .iter()
                .zip(items)
                .map(|(ty, item)| coerce(param, ty, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::Tuple)
        }
        _ if ty.matches(value) => Ok(value.clone()),
        _ => Err(mismatch()),
    }
}

// =============================================================================
// CALLS
// =============================================================================

/// A function chosen from an ABI together with arguments already checked
/// against it.
#[derive(Clone, Debug)]
pub struct PreparedCall<'a> {
    function: &'a Function,
    args: Vec<AbiValue>,
}

impl<'a> PreparedCall<'a> {
    /// Picks the overload of `method` in `abi` that accepts `args`.
    pub fn new(
        contract: &str,
        abi: &'a JsonAbi,
        method: &str,
        args: &[AbiValue],
    ) -> Result<Self, InterfaceError> {
        let unknown = || InterfaceError::UnknownFunction {
            contract: contract.to_string(),
            function: method.to_string(),
        };

        if method.contains('(') {
            let function = abi
                .functions()
                .find(|f| f.signature() == method)
                .ok_or_else(unknown)?;
            let coerced = coerce_arguments(&function.name, &function.inputs, args)?;
            return Ok(Self {
                function,
                args: coerced,
            });
        }

        let overloads = abi.function(method).ok_or_else(unknown)?;
        let mut arity_error = None;
        let mut other_error = None;
        for function in overloads {
            match coerce_arguments(&function.name, &function.inputs, args) {
                Ok(coerced) => {
                    return Ok(Self {
                        function,
                        args: coerced,
                    })
                }
                // An overload of the right arity explains the failure best
                Err(e) if function.inputs.len() == args.len() => {
                    arity_error.get_or_insert(e);
                }
                Err(e) => {
                    other_error.get_or_insert(e);
                }
            }
        }
        Err(arity_error.or(other_error).unwrap_or_else(unknown))
    }

    /// The selected function.
    #[must_use]
    pub fn function(&self) -> &'a Function {
        self.function
    }

    /// Selector followed by the encoded arguments.
    pub fn calldata(&self) -> Result<Vec<u8>, InterfaceError> {
        self.function
            .abi_encode_input(&self.args)
            .map_err(|e| InterfaceError::Codec(e.to_string()))
    }

    /// Decodes the function's return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, InterfaceError> {
        self.function
            .abi_decode_output(data, true)
            .map_err(|e| InterfaceError::Codec(e.to_string()))
    }
}

/// True for `view` and `pure` functions, including legacy `constant` ones.
#[must_use]
pub fn is_read_only(function: &Function) -> bool {
    matches!(
        function.state_mutability,
        StateMutability::View | StateMutability::Pure
    )
}

/// Encoded constructor arguments, appended to the creation bytecode.
pub fn encode_constructor(
    contract: &str,
    constructor: &Constructor,
    args: &[AbiValue],
) -> Result<Vec<u8>, InterfaceError> {
    let args = coerce_arguments(contract, &constructor.inputs, args)?;
    constructor
        .abi_encode_input(&args)
        .map_err(|e| InterfaceError::Codec(e.to_string()))
}

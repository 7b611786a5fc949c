//! Immutable shape of a registered callable.

use crate::error::RegistrationError;
use crate::host_type::HostType;
use crate::member::HostMember;
use crate::type_hash::TypeHash;

/// How results of a call reach the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnArity {
    /// Void return: nothing is pushed.
    None,
    /// The adapter pushes exactly one value.
    Single,
    /// The callable pushes any number of values itself.
    Multiple,
}

/// Metadata computed once per registered member.
///
/// Holds the script-visible parameter list, the static flag, the return
/// arity and the signature used by overload resolution. Every query is a
/// plain field read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    name: String,
    parameter_types: Vec<HostType>,
    is_static: bool,
    has_self: bool,
    return_arity: ReturnArity,
    signature: String,
    signature_hash: TypeHash,
}

impl CallableDescriptor {
    /// Compute the descriptor of `member`.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::ReturnTypeWithReturnValues`] if the member
    ///   declares a non-void return type and a leading return values sink
    /// - [`RegistrationError::MisplacedReturnValues`] if a return values sink
    ///   appears anywhere but the first parameter
    pub fn new(member: &HostMember, has_self: bool) -> Result<Self, RegistrationError> {
        let return_arity = return_arity(member)?;

        let declared = member.params();
        let parameter_types = match return_arity {
            ReturnArity::Multiple => declared[1..].to_vec(),
            _ => declared.to_vec(),
        };

        let is_static = member.is_static();
        let signature = render_signature(member, is_static, &parameter_types);
        let signature_hash = hash_signature(member, is_static, &parameter_types);

        Ok(Self {
            name: member.name().to_owned(),
            parameter_types,
            is_static,
            has_self,
            return_arity,
            signature,
            signature_hash,
        })
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Script-visible parameter types, excluding a leading sink.
    pub fn parameter_types(&self) -> &[HostType] {
        &self.parameter_types
    }

    /// Number of script-visible parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameter_types.len()
    }

    /// Whether the callable needs no receiver.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the script call site supplies the receiver.
    pub fn has_self(&self) -> bool {
        self.has_self
    }

    /// How results reach the sink.
    pub fn return_arity(&self) -> ReturnArity {
        self.return_arity
    }

    /// Signature string used as an overload resolution key.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Hash of the same shape as [`signature`](Self::signature).
    pub fn signature_hash(&self) -> TypeHash {
        self.signature_hash
    }
}

fn return_arity(member: &HostMember) -> Result<ReturnArity, RegistrationError> {
    let params = member.params();

    if let Some(pos) = params.iter().skip(1).position(HostType::is_return_values) {
        return Err(RegistrationError::MisplacedReturnValues {
            member: member.name().to_owned(),
            index: pos + 1,
        });
    }

    let leading_sink = params.first().is_some_and(HostType::is_return_values);
    let returns_void = member.return_type().is_void();

    match (leading_sink, returns_void) {
        (true, true) => Ok(ReturnArity::Multiple),
        (true, false) => Err(RegistrationError::ReturnTypeWithReturnValues {
            member: member.name().to_owned(),
            return_type: member.return_type().clone(),
        }),
        (false, true) => Ok(ReturnArity::None),
        (false, false) => Ok(ReturnArity::Single),
    }
}

fn render_signature(member: &HostMember, is_static: bool, params: &[HostType]) -> String {
    let mut signature = String::new();
    if let Some(declaring) = member.declaring_type() {
        signature.push_str(declaring);
        signature.push(if is_static { '.' } else { ':' });
    }
    signature.push_str(member.name());
    signature.push('(');
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            signature.push(',');
        }
        signature.push_str(param.name());
    }
    signature.push(')');
    signature
}

fn hash_signature(member: &HostMember, is_static: bool, params: &[HostType]) -> TypeHash {
    let param_hashes: Vec<TypeHash> = params.iter().map(HostType::type_hash).collect();

    if is_static {
        match member.declaring_type() {
            Some(declaring) => {
                let qualified = format!("{declaring}.{}", member.name());
                TypeHash::from_function(&qualified, &param_hashes)
            }
            None => TypeHash::from_function(member.name(), &param_hashes),
        }
    } else {
        let owner = member
            .declaring_type()
            .map(TypeHash::from_name)
            .unwrap_or(TypeHash::EMPTY);
        TypeHash::from_method(owner, member.name(), &param_hashes)
    }
}

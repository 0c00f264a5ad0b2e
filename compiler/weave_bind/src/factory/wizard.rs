//! Member function classification.
//!
//! A member function's access, virtuality and transformations decide two
//! things: how it is registered on the class (the maker) and what code it
//! needs inside the class wrapper. Either may be absent.

use weave_ir::{Access, Virtuality};

use crate::creators::{MemberMaker, MemberWrapper};

/// What the classifier needs to know about one member function.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct MemberTraits {
    pub access: Access,
    pub virtuality: Virtuality,
    pub is_static: bool,
    pub transformed: bool,
    pub overridable: bool,
}

pub(crate) fn classify(member: MemberTraits) -> (Option<MemberMaker>, Option<MemberWrapper>) {
    use MemberMaker as M;
    use MemberWrapper as W;
    use Virtuality::{NotVirtual, PureVirtual, Virtual};

    match (member.access, member.virtuality) {
        (Access::Public, NotVirtual) if member.transformed => (Some(M::Transformed), Some(W::Transformed)),
        (Access::Public, NotVirtual) => (Some(M::Plain), None),
        (Access::Public, PureVirtual) => (Some(M::PureVirtual), Some(W::PureVirtual)),
        (Access::Public, Virtual) if member.transformed => {
            (Some(M::VirtualTransformed), Some(W::VirtualTransformed))
        }
        (Access::Public, Virtual) if member.overridable => (Some(M::Virtual), Some(W::Virtual)),
        (Access::Public, Virtual) => (Some(M::Plain), None),

        (Access::Protected, NotVirtual) if member.is_static => {
            (Some(M::ProtectedStatic), Some(W::ProtectedStatic))
        }
        (Access::Protected, NotVirtual) => (Some(M::Protected), Some(W::Protected)),
        (Access::Protected, Virtual) if member.overridable => {
            (Some(M::ProtectedVirtual), Some(W::ProtectedVirtual))
        }
        (Access::Protected, Virtual) => (None, None),
        (Access::Protected, PureVirtual) => {
            (Some(M::ProtectedPureVirtual), Some(W::ProtectedPureVirtual))
        }

        // Private non-virtual functions never get here; exportability
        // rejects them.
        (Access::Private, NotVirtual) => (None, None),
        (Access::Private, PureVirtual) => (None, Some(W::PrivatePureVirtual)),
        (Access::Private, Virtual) if member.overridable => (None, Some(W::PrivateVirtual)),
        (Access::Private, Virtual) => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn traits(access: Access, virtuality: Virtuality) -> MemberTraits {
        MemberTraits {
            access,
            virtuality,
            is_static: false,
            transformed: false,
            overridable: true,
        }
    }

    #[test]
    fn test_public_functions() {
        assert_eq!(
            classify(traits(Access::Public, Virtuality::NotVirtual)),
            (Some(MemberMaker::Plain), None)
        );
        assert_eq!(
            classify(traits(Access::Public, Virtuality::Virtual)),
            (Some(MemberMaker::Virtual), Some(MemberWrapper::Virtual))
        );
        let sealed = MemberTraits {
            overridable: false,
            ..traits(Access::Public, Virtuality::Virtual)
        };
        assert_eq!(classify(sealed), (Some(MemberMaker::Plain), None));
        let transformed = MemberTraits {
            transformed: true,
            ..traits(Access::Public, Virtuality::Virtual)
        };
        assert_eq!(
            classify(transformed),
            (
                Some(MemberMaker::VirtualTransformed),
                Some(MemberWrapper::VirtualTransformed)
            )
        );
    }

    #[test]
    fn test_protected_functions() {
        let static_fn = MemberTraits {
            is_static: true,
            ..traits(Access::Protected, Virtuality::NotVirtual)
        };
        assert_eq!(
            classify(static_fn),
            (
                Some(MemberMaker::ProtectedStatic),
                Some(MemberWrapper::ProtectedStatic)
            )
        );
        assert_eq!(
            classify(traits(Access::Protected, Virtuality::PureVirtual)),
            (
                Some(MemberMaker::ProtectedPureVirtual),
                Some(MemberWrapper::ProtectedPureVirtual)
            )
        );
    }

    #[test]
    fn test_private_virtuals_only_get_wrappers() {
        assert_eq!(
            classify(traits(Access::Private, Virtuality::PureVirtual)),
            (None, Some(MemberWrapper::PrivatePureVirtual))
        );
        assert_eq!(
            classify(traits(Access::Private, Virtuality::Virtual)),
            (None, Some(MemberWrapper::PrivateVirtual))
        );
    }
}

//! Pre-invocation check predicates.
//!
//! Checks are evaluated in registration order after resolution succeeds
//! and before the command body runs; the first failing check aborts the
//! invocation with its specific error and the body never executes.

use thiserror::Error;

use crate::context::{ChannelKind, Context, Permissions};

/// A check predicate over the invocation context.
pub type Check = Box<dyn Fn(&Context) -> Result<(), CheckError> + Send + Sync>;

/// Why a check vetoed an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The author is not the bot owner.
    #[error("This command can only be used by the bot owner.")]
    NotOwner,
    /// The author is not a bot admin.
    #[error("This command can only be used by bot admins.")]
    NotAdmin,
    /// The command was used in a direct message but requires a guild.
    #[error("This command cannot be used in direct messages.")]
    NoPrivateMessage,
    /// The author lacks required permissions.
    #[error("You are missing the following permissions: {missing}")]
    MissingPermissions { missing: String },
    /// The bot itself lacks required permissions.
    #[error("Can't execute command! I'm missing the following permissions: {missing}")]
    InsufficientPermissions { missing: String },
    /// A custom check failed with its own message.
    #[error("{0}")]
    Other(String),
}

/// Requires the invocation to originate from a guild channel.
pub fn guild_only() -> Check {
    Box::new(|ctx| match ctx.channel.kind {
        ChannelKind::Guild => Ok(()),
        ChannelKind::Direct => Err(CheckError::NoPrivateMessage),
    })
}

/// Requires the author to be the bot owner.
pub fn owner_only() -> Check {
    Box::new(|ctx| {
        if ctx.author.is_owner {
            Ok(())
        } else {
            Err(CheckError::NotOwner)
        }
    })
}

/// Requires the author to be a bot admin.
pub fn admin_only() -> Check {
    Box::new(|ctx| {
        if ctx.author.is_admin {
            Ok(())
        } else {
            Err(CheckError::NotAdmin)
        }
    })
}

/// Requires both the author and the bot to hold `required` permissions.
///
/// The author is checked first, so a user missing permissions sees their
/// own failure rather than the bot's.
pub fn has_permissions(required: Permissions) -> Check {
    Box::new(move |ctx| {
        let missing = required - ctx.author.permissions;
        if !missing.is_empty() {
            return Err(CheckError::MissingPermissions {
                missing: missing.describe(),
            });
        }
        let missing = required - ctx.own_permissions;
        if !missing.is_empty() {
            return Err(CheckError::InsufficientPermissions {
                missing: missing.describe(),
            });
        }
        Ok(())
    })
}

/// Requires only the bot to hold `required` permissions.
pub fn bot_has_permissions(required: Permissions) -> Check {
    Box::new(move |ctx| {
        let missing = required - ctx.own_permissions;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CheckError::InsufficientPermissions {
                missing: missing.describe(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{direct_context, fixture_context};

    #[test]
    fn test_guild_only_rejects_direct_messages() {
        assert!(guild_only()(&fixture_context()).is_ok());
        assert_eq!(
            guild_only()(&direct_context()),
            Err(CheckError::NoPrivateMessage)
        );
    }

    #[test]
    fn test_owner_only() {
        let mut ctx = fixture_context();
        assert_eq!(owner_only()(&ctx), Err(CheckError::NotOwner));

        ctx.author.is_owner = true;
        assert!(owner_only()(&ctx).is_ok());
    }

    #[test]
    fn test_has_permissions_reports_author_first() {
        let mut ctx = fixture_context();
        ctx.author.permissions = Permissions::KICK_MEMBERS;
        ctx.own_permissions = Permissions::empty();

        let check = has_permissions(Permissions::KICK_MEMBERS | Permissions::BAN_MEMBERS);
        assert_eq!(
            check(&ctx),
            Err(CheckError::MissingPermissions {
                missing: "ban members".to_string()
            })
        );
    }

    #[test]
    fn test_has_permissions_reports_insufficient_bot_permissions() {
        let mut ctx = fixture_context();
        ctx.author.permissions = Permissions::BAN_MEMBERS;
        ctx.own_permissions = Permissions::empty();

        let check = has_permissions(Permissions::BAN_MEMBERS);
        assert_eq!(
            check(&ctx),
            Err(CheckError::InsufficientPermissions {
                missing: "ban members".to_string()
            })
        );
    }
}

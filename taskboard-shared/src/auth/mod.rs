/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`jwt`]: Validation of identity provider access tokens
/// - [`middleware`]: Bearer token extraction and the request's `AuthContext`
/// - [`authorization`]: Card and task ownership checks
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims, JwtSettings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = JwtSettings::new("secret-key-at-least-32-bytes-long!!", "taskboard");
/// let token = create_token(&Claims::new(1, "taskboard"), &settings.secret)?;
/// let claims = validate_token(&token, &settings)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;

//! Minimal inline HTML bodies for transactional mail.

pub fn verify_email_body(username: &str, verify_url: &str) -> String {
    format!(
        "<p>Dear {username},</p>\
         <p>Thank you for registering with BlinkMart.</p>\
         <p><a href=\"{verify_url}\" style=\"color:white;background:#071263;margin-top:10px;padding:20px\">Verify Email</a></p>"
    )
}

pub fn password_reset_otp_body(username: &str, otp: &str) -> String {
    format!(
        "<p>Dear {username},</p>\
         <p>You requested a password reset. Use the following OTP code to reset your password.</p>\
         <div style=\"background:yellow;font-size:20px;padding:20px;text-align:center;font-weight:800\">{otp}</div>\
         <p>This OTP is valid for 10 minutes only.</p>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_interpolate_fields() {
        let body = verify_email_body("Asha", "https://shop.example.com/verify?code=abc");
        assert!(body.contains("Asha"));
        assert!(body.contains("verify?code=abc"));

        let body = password_reset_otp_body("Asha", "123456");
        assert!(body.contains("123456"));
        assert!(body.contains("10 minutes"));
    }
}

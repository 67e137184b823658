mod common;

use anyhow::Result;
use chrono::{Months, Utc};
use common::{adult_user, register_holder, test_service};
use toman::application::AppError;
use toman::domain::MINIMUM_BALANCE;
use uuid::Uuid;

#[tokio::test]
async fn test_registration_opens_wallet_at_minimum_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let registration = register_holder(&service, "Sara Ahmadi").await?;

    assert_eq!(registration.wallet.balance, MINIMUM_BALANCE);
    assert_eq!(registration.wallet.owner_id, registration.user.id);

    // Both records are durable
    let user = service.get_user(registration.user.id).await?;
    assert_eq!(user.full_name, "Sara Ahmadi");

    let wallet = service.get_wallet_by_user(user.id).await?;
    assert_eq!(wallet.id, registration.wallet.id);
    assert_eq!(wallet.balance, MINIMUM_BALANCE);

    Ok(())
}

#[tokio::test]
async fn test_underage_registration_persists_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut details = adult_user("Young Holder");
    details.date_of_birth = Utc::now().date_naive() - Months::new(120); // ten years old

    let err = service
        .register_user(
            details,
            "1234567890".to_string(),
            "IR0123456789012345678901".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserNotEligible));

    assert!(service.list_users().await?.is_empty());
    assert!(service.list_wallets().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_registration_rejects_blank_account_details() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .register_user(
            adult_user("Sara Ahmadi"),
            "".to_string(),
            "IR0123456789012345678901".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAccountDetails(_)));

    let err = service
        .register_user(
            adult_user("Sara Ahmadi"),
            "1234567890".to_string(),
            "   ".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAccountDetails(_)));

    assert!(service.list_users().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_each_user_holds_at_most_one_wallet() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let registration = register_holder(&service, "Sara Ahmadi").await?;

    let err = service
        .create_wallet(
            registration.user.id,
            "9876543210".to_string(),
            "IR9876543210987654321098".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WalletAlreadyExists(_)));

    assert_eq!(service.list_wallets().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_create_wallet_requires_an_existing_user() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .create_wallet(
            Uuid::new_v4(),
            "1234567890".to_string(),
            "IR0123456789012345678901".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_create_wallet_rejects_blank_account_details() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .create_wallet(
            Uuid::new_v4(),
            "".to_string(),
            "IR0123456789012345678901".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAccountDetails(_)));

    let err = service
        .create_wallet(Uuid::new_v4(), "1234567890".to_string(), "".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAccountDetails(_)));

    Ok(())
}

#[tokio::test]
async fn test_unknown_wallet_lookup_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_wallet_details(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::WalletNotFound(_)));

    let err = service.get_balance(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::WalletNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_unknown_user_lookup_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::UserNotFound(_)));

    let err = service.get_wallet_by_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::WalletNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_login_requires_both_identifiers_to_match() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let wallet_id = register_holder(&service, "Sara Ahmadi").await?.wallet.id;

    assert!(
        service
            .login(wallet_id, "1234567890", "IR0123456789012345678901")
            .await?
    );
    assert!(
        !service
            .login(wallet_id, "1234567890", "IR9999999999999999999999")
            .await?
    );
    assert!(
        !service
            .login(wallet_id, "0000000000", "IR0123456789012345678901")
            .await?
    );

    Ok(())
}

#[tokio::test]
async fn test_login_against_an_unknown_wallet_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .login(Uuid::new_v4(), "1234567890", "IR0123456789012345678901")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::WalletNotFound(_)));

    Ok(())
}

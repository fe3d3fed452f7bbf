//! Marketplace commands.
//!
//! # Usage
//!
//! ```bash
//! luxtime watches list --brand Omega --condition seminovo --limit 20
//! luxtime watches show 42
//! luxtime watches create --brand Tudor --model "Black Bay" --reference 79230N \
//!     --serial-number SN123 --condition novo --price 23500
//! luxtime watches buy 42 --method pix --cpf 000.000.000-00
//! ```

use clap::{Args, Subcommand, ValueEnum};
use luxtime_core::{
    CardDetails, CheckoutMethod, NewWatch, PurchaseRequest, WatchCondition, WatchFilter, WatchId,
};
use rust_decimal::Decimal;
use secrecy::SecretString;

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum WatchAction {
    /// Search the marketplace
    List(ListArgs),
    /// Show one listing
    Show {
        /// Watch ID
        id: WatchId,
    },
    /// List a watch for sale (store accounts)
    Create(CreateArgs),
    /// Buy a watch
    Buy(BuyArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// `novo`, `seminovo` or `usado`
    #[arg(long)]
    condition: Option<WatchCondition>,
    #[arg(long)]
    price_min: Option<Decimal>,
    #[arg(long)]
    price_max: Option<Decimal>,
    #[arg(long)]
    year_from: Option<i32>,
    #[arg(long)]
    year_to: Option<i32>,
    /// Free-text search
    #[arg(short, long)]
    search: Option<String>,
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long)]
    skip: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<ListArgs> for WatchFilter {
    fn from(args: ListArgs) -> Self {
        Self {
            brand: args.brand,
            model: args.model,
            category: args.category,
            condition: args.condition,
            price_min: args.price_min,
            price_max: args.price_max,
            year_from: args.year_from,
            year_to: args.year_to,
            search: args.search,
            sort_by: args.sort_by,
            skip: args.skip,
            limit: args.limit,
        }
    }
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    brand: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    reference: String,
    #[arg(long)]
    serial_number: String,
    #[arg(long)]
    year: Option<i32>,
    /// `novo`, `seminovo` or `usado`
    #[arg(long)]
    condition: WatchCondition,
    /// Asking price in BRL
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    description: Option<String>,
    /// Image URL (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Pix,
    CreditCard,
}

#[derive(Args)]
pub struct BuyArgs {
    /// Watch ID
    id: WatchId,
    #[arg(long, value_enum, default_value = "pix")]
    method: Method,
    /// Number of card installments
    #[arg(long)]
    installments: Option<u8>,
    #[arg(long, env = "LUXTIME_CARD_NUMBER", hide_env_values = true)]
    card_number: Option<String>,
    #[arg(long)]
    card_name: Option<String>,
    /// `MM/YY`
    #[arg(long)]
    card_expiry: Option<String>,
    #[arg(long, env = "LUXTIME_CARD_CVV", hide_env_values = true)]
    card_cvv: Option<String>,
    /// Buyer's CPF
    #[arg(long)]
    cpf: Option<String>,
}

impl TryFrom<BuyArgs> for PurchaseRequest {
    type Error = CommandError;

    fn try_from(args: BuyArgs) -> Result<Self, Self::Error> {
        let (payment_method, card) = match args.method {
            Method::Pix => (CheckoutMethod::Pix, None),
            Method::CreditCard => {
                let (Some(number), Some(holder_name), Some(expiry)) =
                    (args.card_number, args.card_name, args.card_expiry)
                else {
                    return Err(CommandError::InvalidArgument(
                        "credit card purchases need --card-number, --card-name and --card-expiry"
                            .to_string(),
                    ));
                };
                let card = CardDetails {
                    number: SecretString::from(number),
                    holder_name,
                    expiry,
                    cvv: args.card_cvv.map(SecretString::from),
                };
                (CheckoutMethod::CreditCard, Some(card))
            }
        };

        Ok(Self {
            payment_method,
            installments: args.installments,
            card,
            cpf: args.cpf,
        })
    }
}

pub async fn run(ctx: &Context, action: WatchAction) -> Result<(), CommandError> {
    match action {
        WatchAction::List(args) => {
            let watches = ctx.api.watches(&args.into()).await?;
            tracing::info!("{} watches found", watches.len());
            print_json(&watches)
        }
        WatchAction::Show { id } => print_json(&ctx.api.watch(id).await?),
        WatchAction::Create(args) => {
            ctx.require_user().await?;
            let new_watch = NewWatch {
                brand: args.brand,
                model: args.model,
                reference: args.reference,
                serial_number: args.serial_number,
                year: args.year,
                condition: args.condition,
                price: args.price,
                description: args.description,
                images: args.images,
            };
            let watch = ctx.api.create_watch(&new_watch).await?;
            tracing::info!("Listed watch {}", watch.id);
            print_json(&watch)
        }
        WatchAction::Buy(args) => {
            ctx.require_user().await?;
            let id = args.id;
            let request = PurchaseRequest::try_from(args)?;
            let purchase = ctx.api.purchase_watch(id, &request).await?;
            tracing::info!("Purchase {} is {:?}", purchase.id, purchase.status);
            print_json(&purchase)
        }
    }
}

use mongodb::bson::{self, doc, oid::ObjectId};

use crate::database::MongoDB;
use crate::models::{
    Campaign, EmailActivity, Lead, List, Mail, Plan, PlanValue, ResponseWindow, User,
};

/// Collections replaced by the sample seed
const COLLECTIONS: [&str; 7] = [
    "users",
    "plans",
    "campaigns",
    "leads",
    "lists",
    "mails",
    "emailactivities",
];

/// Seed a small demo dataset covering every endpoint. Wipes and recreates
/// the collections above, so it only runs when SEED_SAMPLE_DATA=true.
pub async fn seed_sample_data(db: &MongoDB) {
    if let Err(e) = run(db).await {
        log::error!("❌ Sample data seed failed: {}", e);
    }
}

async fn run(db: &MongoDB) -> mongodb::error::Result<()> {
    log::info!("🌱 Seeding sample data (replaces existing collections)...");

    for name in COLLECTIONS {
        db.collection::<bson::Document>(name)
            .delete_many(doc! {})
            .await?;
    }
    log::info!("   🧹 Cleared {} collections", COLLECTIONS.len());

    let now = bson::DateTime::now();

    let user_ids = [
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
    ];
    let list_ids = [ObjectId::new(), ObjectId::new()];
    let lead_ids = [
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
    ];
    let mail_ids = [ObjectId::new(), ObjectId::new()];
    let campaign_ids = [
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
        ObjectId::new(),
    ];

    let plans = build_plans(now);
    db.collection::<Plan>("plans").insert_many(&plans).await?;
    log::info!("   ✅ Plans: {}", plans.len());

    let users = build_users(&user_ids, now);
    db.collection::<User>("users").insert_many(&users).await?;
    log::info!("   ✅ Users: {}", users.len());

    let lists = build_lists(&list_ids, &user_ids, now);
    db.collection::<List>("lists").insert_many(&lists).await?;
    log::info!("   ✅ Lists: {}", lists.len());

    let leads = build_leads(&lead_ids, &list_ids, now);
    db.collection::<Lead>("leads").insert_many(&leads).await?;
    log::info!("   ✅ Leads: {}", leads.len());

    let mails = build_mails(&mail_ids, &user_ids);
    db.collection::<Mail>("mails").insert_many(&mails).await?;
    log::info!("   ✅ Mail accounts: {}", mails.len());

    let campaigns = build_campaigns(&campaign_ids, &user_ids, &list_ids, now);
    db.collection::<Campaign>("campaigns")
        .insert_many(&campaigns)
        .await?;
    log::info!("   ✅ Campaigns: {}", campaigns.len());

    let activities = build_activities(&lead_ids, &campaign_ids, &mail_ids, now);
    db.collection::<EmailActivity>("emailactivities")
        .insert_many(&activities)
        .await?;
    log::info!("   ✅ Email activities: {}", activities.len());

    log::info!("🌱 Sample data ready");
    Ok(())
}

fn build_plans(now: bson::DateTime) -> Vec<Plan> {
    let plan = |name: &str, price: i64, email_limit: i64| Plan {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        price,
        email_limit,
        stripe_price_id: Some(String::new()),
        description: Some(String::new()),
        created_at: Some(now),
        updated_at: Some(now),
    };

    vec![
        plan("basic", 0, 100),
        plan("premium", 2900, 5000),
        plan("premiumPlus", 9900, 50000),
    ]
}

fn build_users(ids: &[ObjectId; 5], now: bson::DateTime) -> Vec<User> {
    let user = |id: ObjectId,
                username: &str,
                email: &str,
                password: &str,
                role: &str,
                plan: &str,
                verified: bool| User {
        id: Some(id),
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: Some(role.to_string()),
        plan: Some(PlanValue::Name(plan.to_string())),
        is_verified: verified,
        verification_code: None,
        code_expires: None,
        reset_token: None,
        reset_token_expiry: None,
        provider: None,
        image: Some(String::new()),
        created_at: Some(now),
        updated_at: Some(now),
    };

    vec![
        user(ids[0], "admin", "admin@sebastian.com", "admin123", "admin", "Pro", true),
        user(ids[1], "john_doe", "john@example.com", "password123", "regular", "Pro", true),
        user(ids[2], "jane_smith", "jane@example.com", "password123", "regular", "Free", true),
        user(ids[3], "bob_wilson", "bob@example.com", "password123", "regular", "Free", false),
        user(ids[4], "alice_brown", "alice@example.com", "password123", "regular", "Pro", true),
    ]
}

fn build_lists(ids: &[ObjectId; 2], user_ids: &[ObjectId; 5], now: bson::DateTime) -> Vec<List> {
    vec![
        List {
            id: Some(ids[0]),
            name: Some("Tech Leads".to_string()),
            status: "active".to_string(),
            source: vec!["website".to_string(), "linkedin".to_string()],
            user_id: user_ids[1],
            created_at: Some(now),
            updated_at: Some(now),
        },
        List {
            id: Some(ids[1]),
            name: Some("Marketing Leads".to_string()),
            status: "active".to_string(),
            source: vec!["linkedin".to_string(), "referral".to_string()],
            user_id: user_ids[2],
            created_at: Some(now),
            updated_at: Some(now),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn lead(
    id: ObjectId,
    list_id: ObjectId,
    name: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
    title: &str,
    seniority: &str,
    company: &str,
    location: &str,
    city: &str,
    industry: &str,
    now: bson::DateTime,
) -> Lead {
    Lead {
        id: Some(id),
        email: email.to_string(),
        list_id,
        name: Some(name.to_string()),
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        title: Some(title.to_string()),
        seniority: Some(seniority.to_string()),
        phone: None,
        linkedin: None,
        website: None,
        job: None,
        company: Some(company.to_string()),
        company_clean: Some(company.to_string()),
        company_location: Some(location.to_string()),
        company_city: Some(city.to_string()),
        company_country: Some("USA".to_string()),
        company_description: None,
        company_site: None,
        company_industry: Some(industry.to_string()),
        company_linkdedin: None,
        company_linkedin_id: None,
        company_staff_count: None,
        company_staff_range: None,
        contact_country: Some("USA".to_string()),
        contact_city: Some(city.to_string()),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

fn build_leads(ids: &[ObjectId; 4], list_ids: &[ObjectId; 2], now: bson::DateTime) -> Vec<Lead> {
    vec![
        lead(
            ids[0], list_ids[0], "John Lead", "John", "Lead", "lead1@company.com",
            "CTO", "C-Level", "Tech Corp", "San Francisco, CA", "San Francisco",
            "Technology", now,
        ),
        lead(
            ids[1], list_ids[0], "Sarah Manager", "Sarah", "Manager", "lead2@company.com",
            "Marketing Director", "Director", "Marketing Inc", "New York, NY", "New York",
            "Marketing", now,
        ),
        lead(
            ids[2], list_ids[1], "Mike Director", "Mike", "Director", "lead3@company.com",
            "Sales Director", "Director", "Sales Co", "Chicago, IL", "Chicago",
            "Sales", now,
        ),
        lead(
            ids[3], list_ids[1], "Lisa CEO", "Lisa", "CEO", "lead4@company.com",
            "CEO", "C-Level", "Startup XYZ", "Austin, TX", "Austin",
            "Startup", now,
        ),
    ]
}

fn build_mails(ids: &[ObjectId; 2], user_ids: &[ObjectId; 5]) -> Vec<Mail> {
    vec![
        Mail {
            id: Some(ids[0]),
            provider: "gmail".to_string(),
            email: "noreply@sebastian.com".to_string(),
            status: true,
            warm_up_status: true,
            user_id: user_ids[1],
            access_token: None,
            refresh_token: None,
        },
        Mail {
            id: Some(ids[1]),
            provider: "gmail".to_string(),
            email: "marketing@sebastian.com".to_string(),
            status: true,
            warm_up_status: true,
            user_id: user_ids[2],
            access_token: None,
            refresh_token: None,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn campaign(
    id: ObjectId,
    name: &str,
    status: &str,
    tone: &str,
    response_from: (i64, &str),
    response_to: (i64, &str),
    sender: &str,
    user_id: ObjectId,
    list_id: ObjectId,
    now: bson::DateTime,
) -> Campaign {
    Campaign {
        id: Some(id),
        name: Some(name.to_string()),
        status: status.to_string(),
        language: Some("English".to_string()),
        tone_of_voice: Some(tone.to_string()),
        show_email_address: Some(true),
        un_subscribe: Some(true),
        un_subscribe_type: Some("link".to_string()),
        response_from: Some(ResponseWindow {
            time: Some(response_from.0),
            unit: Some(response_from.1.to_string()),
        }),
        response_to: Some(ResponseWindow {
            time: Some(response_to.0),
            unit: Some(response_to.1.to_string()),
        }),
        sender: Some(sender.to_string()),
        user_id,
        list_id: Some(list_id),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

fn build_campaigns(
    ids: &[ObjectId; 4],
    user_ids: &[ObjectId; 5],
    list_ids: &[ObjectId; 2],
    now: bson::DateTime,
) -> Vec<Campaign> {
    vec![
        campaign(
            ids[0], "Q3 Launch", "active", "Professional", (1, "day"), (7, "days"),
            "noreply@sebastian.com", user_ids[1], list_ids[0], now,
        ),
        campaign(
            ids[1], "Spring Promo", "paused", "Friendly", (2, "days"), (14, "days"),
            "marketing@sebastian.com", user_ids[2], list_ids[1], now,
        ),
        campaign(
            ids[2], "Welcome Series", "completed", "Welcoming", (1, "day"), (5, "days"),
            "noreply@sebastian.com", user_ids[1], list_ids[0], now,
        ),
        campaign(
            ids[3], "Product Update", "draft", "Informative", (1, "day"), (10, "days"),
            "noreply@sebastian.com", user_ids[1], list_ids[0], now,
        ),
    ]
}

fn build_activities(
    lead_ids: &[ObjectId; 4],
    campaign_ids: &[ObjectId; 4],
    mail_ids: &[ObjectId; 2],
    now: bson::DateTime,
) -> Vec<EmailActivity> {
    let activity = |lead_id: ObjectId, kind: &str, subject: &str, body: &str, step: i64| {
        EmailActivity {
            id: Some(ObjectId::new()),
            lead_id,
            campaign_id: campaign_ids[0],
            sender_id: mail_ids[0],
            activity_type: kind.to_string(),
            subject: Some(subject.to_string()),
            body: Some(body.to_string()),
            timestamp: now,
            sequence_step: Some(step),
            reply_to: None,
            sentiment: None,
            intent: None,
            handled_by_ai: None,
            can_ai_reply: false,
            created_at: Some(now),
            updated_at: Some(now),
        }
    };

    vec![
        activity(
            lead_ids[0], "sent",
            "Exciting Q3 Launch - Don't Miss Out!",
            "We're launching amazing new features...",
            1,
        ),
        activity(
            lead_ids[1], "sent",
            "Exciting Q3 Launch - Don't Miss Out!",
            "We're launching amazing new features...",
            1,
        ),
        activity(
            lead_ids[0], "reply",
            "Re: Exciting Q3 Launch - Don't Miss Out!",
            "This looks interesting! Tell me more...",
            2,
        ),
    ]
}

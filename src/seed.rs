//! Sample data for local development.
//!
//! [`run`] replaces the contents of every table in a single transaction, so a
//! failed seed leaves the previous data in place.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::{
    analytics, blog, messages,
    models::{
        MessageStatus, NewBlogPost, NewInteraction, NewMessage, NewPageView, NewProduct,
        NewProject, Priority, ProjectStatus, UpdateMessage,
    },
    products, projects,
};
use crate::error::AppResult;

/// Tables in delete order
const TABLES: [&str; 6] = [
    "projects",
    "blog_posts",
    "products",
    "messages",
    "page_views",
    "interactions",
];

/// Days of generated traffic
const TRAFFIC_DAYS: i64 = 30;

/// Row counts after seeding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub projects: i64,
    pub blog_posts: i64,
    pub products: i64,
    pub messages: i64,
    pub page_views: i64,
    pub interactions: i64,
}

pub async fn run(pool: &SqlitePool) -> AppResult<SeedSummary> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for table in TABLES {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    seed_projects(&mut tx).await?;
    seed_blog_posts(&mut tx, now).await?;
    seed_products(&mut tx).await?;
    seed_messages(&mut tx).await?;
    seed_traffic(&mut tx, now).await?;

    tx.commit().await?;
    tracing::info!("Database seeded");

    count_rows(pool).await
}

pub async fn count_rows(pool: &SqlitePool) -> AppResult<SeedSummary> {
    let mut counts = [0i64; 6];
    for (count, table) in counts.iter_mut().zip(TABLES) {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;
        *count = n;
    }
    let [projects, blog_posts, products, messages, page_views, interactions] = counts;
    Ok(SeedSummary {
        projects,
        blog_posts,
        products,
        messages,
        page_views,
        interactions,
    })
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

async fn seed_projects(conn: &mut SqliteConnection) -> AppResult<()> {
    let samples = [
        NewProject {
            title: text("AI-Powered Task Automation"),
            description: text(
                "A comprehensive automation platform that uses machine learning to optimize \
                 workflow processes. It analyzes user behavior patterns and suggests process \
                 improvements automatically.",
            ),
            short_description: text("ML-powered automation platform for workflow optimization"),
            category: text("AI/ML"),
            tags: strings(&["Python", "TensorFlow", "React", "Machine Learning", "Automation"]),
            tech_stack: strings(&["Python", "TensorFlow", "React", "PostgreSQL", "Docker", "AWS"]),
            image_url: text("/assets/references/modern_os_interface.jpg"),
            demo_url: text("https://demo.example.dev/ai-automation"),
            github_url: text("https://github.com/example/ai-automation"),
            featured: Some(true),
            status: Some(ProjectStatus::Completed),
        },
        NewProject {
            title: text("Digital OS Portfolio"),
            description: text(
                "A portfolio website designed as a complete operating system interface, with \
                 draggable windows, a command palette and a glassmorphism design.",
            ),
            short_description: text("OS-style portfolio with draggable windows and modern UI"),
            category: text("Web Development"),
            tags: strings(&["React", "UI/UX", "Portfolio", "Innovation"]),
            tech_stack: strings(&["React", "Framer Motion", "Tailwind CSS", "SQLite"]),
            image_url: text("/assets/references/dark_ui_design.png"),
            demo_url: text("https://example.dev"),
            github_url: text("https://github.com/example/digital-os-portfolio"),
            featured: Some(true),
            status: Some(ProjectStatus::InProgress),
        },
        NewProject {
            title: text("E-commerce Analytics Dashboard"),
            description: text(
                "Real-time analytics dashboard for e-commerce platforms with data visualization, \
                 predictive analytics and automated reporting.",
            ),
            short_description: text("Real-time e-commerce analytics with predictive insights"),
            category: text("Data Analytics"),
            tags: strings(&["Analytics", "Dashboard", "E-commerce", "Data Visualization"]),
            tech_stack: strings(&["React", "D3.js", "Node.js", "MongoDB", "Redis"]),
            image_url: text("/assets/backgrounds/tech_background_1.jpg"),
            demo_url: text("https://analytics.example.dev"),
            github_url: text("https://github.com/example/ecommerce-analytics"),
            featured: Some(false),
            status: Some(ProjectStatus::Completed),
        },
        NewProject {
            title: text("Smart Home IoT Controller"),
            description: text(
                "Centralized IoT device management with voice control, automated scheduling and \
                 energy optimization.",
            ),
            short_description: text("IoT home automation with voice control"),
            category: text("IoT"),
            tags: strings(&["IoT", "Smart Home", "Voice Control", "Mobile App"]),
            tech_stack: strings(&["React Native", "Node.js", "MQTT", "Raspberry Pi", "Arduino"]),
            image_url: text("/assets/backgrounds/tech_background_2.jpg"),
            demo_url: text("https://smarthome.example.dev"),
            github_url: text("https://github.com/example/smart-home-iot"),
            featured: Some(false),
            status: Some(ProjectStatus::Completed),
        },
        NewProject {
            title: text("Blockchain Voting System"),
            description: text(
                "Voting platform built on a blockchain that keeps results transparent while \
                 preserving voter anonymity.",
            ),
            short_description: text("Blockchain-based voting with transparency and anonymity"),
            category: text("Blockchain"),
            tags: strings(&["Blockchain", "Voting", "Security", "Transparency"]),
            tech_stack: strings(&["Solidity", "Web3.js", "React", "Ethereum", "IPFS"]),
            image_url: text("/assets/backgrounds/developer_workspace.jpg"),
            demo_url: text("https://vote.example.dev"),
            github_url: text("https://github.com/example/blockchain-voting"),
            featured: Some(true),
            status: Some(ProjectStatus::Planned),
        },
    ];

    for sample in &samples {
        projects::create(&mut *conn, sample).await?;
    }
    Ok(())
}

async fn seed_blog_posts(conn: &mut SqliteConnection, now: DateTime<Utc>) -> AppResult<()> {
    // (post, views, days since publication)
    let samples = [
        (
            NewBlogPost {
                title: text("Building a Digital OS Portfolio: Lessons Learned"),
                slug: text("building-digital-os-portfolio-lessons-learned"),
                content: text(
                    "# Building a Digital OS Portfolio\n\n\
                     Creating a portfolio that mimics an operating system interface was both \
                     challenging and rewarding.\n\n\
                     ## Window Management\n\n\
                     Draggable, resizable windows needed careful state management and \
                     memoization to avoid unnecessary re-renders.\n\n\
                     ## Responsive Design\n\n\
                     Making an OS-style interface work on mobile meant adapting the metaphor \
                     rather than abandoning it.\n\n\
                     ## Lessons\n\n\
                     1. User experience first\n\
                     2. Smooth animations sell the illusion\n\
                     3. Start with core functionality and add polish later",
                ),
                excerpt: text(
                    "Lessons from creating an OS-style portfolio interface with modern web tools.",
                ),
                category: text("Development"),
                tags: strings(&["React", "Portfolio", "UI/UX", "Web Development"]),
                featured_image: text("/assets/references/modern_os_interface.jpg"),
                published: Some(true),
                featured: Some(true),
            },
            1250,
            7,
        ),
        (
            NewBlogPost {
                title: text("The Future of AI in Web Development"),
                slug: text("future-ai-web-development"),
                content: text(
                    "# The Future of AI in Web Development\n\n\
                     AI tools are changing how web applications are built, from code completion \
                     to automated testing.\n\n\
                     ## Emerging Trends\n\n\
                     1. No-code AI platforms\n\
                     2. Intelligent test generation\n\
                     3. Automated performance optimization\n\n\
                     Rather than replacing developers, AI augments them. Architecture and \
                     creative problem-solving remain the job.",
                ),
                excerpt: text("How AI is transforming web development and what it means for developers."),
                category: text("AI/ML"),
                tags: strings(&["AI", "Web Development", "Future Tech", "Automation"]),
                featured_image: text("/assets/references/dark_ui_design.png"),
                published: Some(true),
                featured: Some(false),
            },
            890,
            14,
        ),
        (
            NewBlogPost {
                title: text("Mastering React Performance Optimization"),
                slug: text("mastering-react-performance-optimization"),
                content: text(
                    "# Mastering React Performance Optimization\n\n\
                     ## Memoization\n\n\
                     Wrap expensive components in React.memo and stabilise callbacks with \
                     useCallback.\n\n\
                     ## Code Splitting\n\n\
                     Lazy load components at route boundaries.\n\n\
                     ## Measuring\n\n\
                     Profile first, optimize second, and always measure the impact of a change.",
                ),
                excerpt: text("A guide to React performance techniques, from memoization to code splitting."),
                category: text("Development"),
                tags: strings(&["React", "Performance", "Optimization", "JavaScript"]),
                featured_image: text("/assets/backgrounds/tech_background_1.jpg"),
                published: Some(true),
                featured: Some(true),
            },
            2100,
            21,
        ),
    ];

    for (sample, views, days_ago) in &samples {
        let post = blog::insert(&mut *conn, sample).await?;
        sqlx::query("UPDATE blog_posts SET views = ?, published_at = ? WHERE id = ?")
            .bind(views)
            .bind(now - Duration::days(*days_ago))
            .bind(post.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn seed_products(conn: &mut SqliteConnection) -> AppResult<()> {
    let samples = [
        NewProduct {
            name: text("React Component Library"),
            description: text(
                "A collection of 50+ reusable React components with TypeScript support, \
                 Storybook documentation and complete test coverage.",
            ),
            short_description: text("50+ professional React components with TypeScript and tests"),
            price: Some(49.99),
            original_price: Some(79.99),
            category: text("Components"),
            tags: strings(&["React", "TypeScript", "Components", "Storybook"]),
            image_url: text("/assets/references/modern_os_interface.jpg"),
            gallery_images: strings(&[
                "/assets/references/dark_ui_design.png",
                "/assets/backgrounds/tech_background_1.jpg",
            ]),
            download_url: text("https://downloads.example.dev/react-components"),
            file_size: text("15.2 MB"),
            file_format: text("ZIP"),
            featured: Some(true),
            active: Some(true),
            stock_quantity: Some(-1),
            sales_count: Some(127),
            stripe_price_id: text("price_react_components"),
        },
        NewProduct {
            name: text("Full-Stack Starter Template"),
            description: text(
                "Full-stack application template with frontend, backend, database, \
                 authentication, tests and deployment configuration.",
            ),
            short_description: text("Production-ready full-stack template with auth and deployment"),
            price: Some(89.99),
            original_price: Some(129.99),
            category: text("Templates"),
            tags: strings(&["Full-Stack", "React", "Node.js", "PostgreSQL", "Authentication"]),
            image_url: text("/assets/backgrounds/tech_background_2.jpg"),
            gallery_images: strings(&[
                "/assets/backgrounds/developer_workspace.jpg",
                "/assets/references/dark_ui_design.png",
            ]),
            download_url: text("https://downloads.example.dev/fullstack-template"),
            file_size: text("45.8 MB"),
            file_format: text("ZIP"),
            featured: Some(true),
            active: Some(true),
            stock_quantity: Some(-1),
            sales_count: Some(89),
            stripe_price_id: text("price_fullstack_template"),
        },
        NewProduct {
            name: text("AI Integration Toolkit"),
            description: text(
                "AI integration components and utilities for chat, image generation and text \
                 analysis, with hooks, API wrappers and examples.",
            ),
            short_description: text("AI integration components for chat and image generation"),
            price: Some(69.99),
            category: text("AI Tools"),
            tags: strings(&["AI", "Image Generation", "React Hooks"]),
            image_url: text("/assets/backgrounds/developer_workspace.jpg"),
            download_url: text("https://downloads.example.dev/ai-toolkit"),
            file_size: text("8.5 MB"),
            file_format: text("ZIP"),
            featured: Some(false),
            active: Some(true),
            stock_quantity: Some(-1),
            sales_count: Some(45),
            stripe_price_id: text("price_ai_toolkit"),
            ..Default::default()
        },
        NewProduct {
            name: text("Dashboard UI Kit"),
            description: text(
                "Dashboard UI kit with 30+ screens, dark and light themes, responsive layouts \
                 and interactive components.",
            ),
            short_description: text("Modern dashboard UI kit with 30+ screens and themes"),
            price: Some(39.99),
            original_price: Some(59.99),
            category: text("UI Kits"),
            tags: strings(&["Dashboard", "UI Kit", "Admin Panel", "SaaS"]),
            image_url: text("/assets/references/dark_ui_design.png"),
            download_url: text("https://downloads.example.dev/dashboard-ui-kit"),
            file_size: text("25.3 MB"),
            file_format: text("Figma + Code"),
            featured: Some(true),
            active: Some(true),
            stock_quantity: Some(-1),
            sales_count: Some(203),
            stripe_price_id: text("price_dashboard_ui_kit"),
            ..Default::default()
        },
        NewProduct {
            name: text("E-commerce Boilerplate"),
            description: text(
                "E-commerce starter with product management, cart, payment integration, order \
                 management and an admin dashboard.",
            ),
            short_description: text("E-commerce starter with payments and admin dashboard"),
            price: Some(149.99),
            category: text("Templates"),
            tags: strings(&["E-commerce", "Next.js", "Stripe", "Prisma", "Admin Dashboard"]),
            image_url: text("/assets/backgrounds/tech_background_1.jpg"),
            download_url: text("https://downloads.example.dev/ecommerce-boilerplate"),
            file_size: text("67.2 MB"),
            file_format: text("ZIP"),
            featured: Some(false),
            active: Some(true),
            stock_quantity: Some(-1),
            sales_count: Some(34),
            stripe_price_id: text("price_ecommerce_boilerplate"),
            ..Default::default()
        },
    ];

    for sample in &samples {
        products::create(&mut *conn, sample).await?;
    }
    Ok(())
}

async fn seed_messages(conn: &mut SqliteConnection) -> AppResult<()> {
    let samples = [
        (
            NewMessage {
                name: text("Sarah Johnson"),
                email: text("sarah.johnson@techcorp.example"),
                subject: text("Collaboration Opportunity"),
                message: text(
                    "I came across your portfolio and was impressed by your work on AI \
                     automation. Would you be interested in discussing a collaboration?",
                ),
                phone: text("+1-555-0123"),
                company: text("TechCorp Solutions"),
                project_type: text("AI/ML Development"),
                budget_range: text("$10,000 - $25,000"),
                priority: Some(Priority::High),
                source: text("portfolio"),
                ..Default::default()
            },
            MessageStatus::New,
        ),
        (
            NewMessage {
                name: text("Michael Chen"),
                email: text("mike@startup.example"),
                subject: text("Full-Stack Development Inquiry"),
                message: text(
                    "We're an early-stage startup looking for a full-stack developer to help \
                     build our MVP. Can we schedule a call?",
                ),
                company: text("InnovateTech Startup"),
                project_type: text("Full-Stack Development"),
                budget_range: text("$5,000 - $10,000"),
                priority: Some(Priority::Normal),
                source: text("referral"),
                ..Default::default()
            },
            MessageStatus::Read,
        ),
        (
            NewMessage {
                name: text("Emily Rodriguez"),
                email: text("emily.r@designstudio.example"),
                subject: text("UI/UX Collaboration"),
                message: text(
                    "Love your Digital OS portfolio concept! Would you be open to collaborating \
                     on the technical implementation for one of our clients?",
                ),
                phone: text("+1-555-0456"),
                company: text("Creative Design Studio"),
                project_type: text("Frontend Development"),
                budget_range: text("$3,000 - $5,000"),
                priority: Some(Priority::Normal),
                source: text("social_media"),
                ..Default::default()
            },
            MessageStatus::Replied,
        ),
    ];

    for (sample, status) in &samples {
        let message = messages::create(&mut *conn, sample).await?;
        if *status != MessageStatus::New {
            let changes = UpdateMessage {
                status: Some(*status),
                priority: None,
            };
            messages::apply_update(&mut *conn, message.id, &changes).await?;
        }
    }
    Ok(())
}

const PAGES: [(&str, &str); 5] = [
    ("/", "Home - Digital OS Portfolio"),
    ("/portfolio", "Portfolio"),
    ("/blog", "Blog"),
    ("/shop", "Shop"),
    ("/contact", "Contact"),
];

/// Page views with a rising daily trend, plus a handful of interactions per
/// day, over the last [`TRAFFIC_DAYS`] days.
async fn seed_traffic(conn: &mut SqliteConnection, now: DateTime<Utc>) -> AppResult<()> {
    let start = now - Duration::days(TRAFFIC_DAYS);

    for day in 0..TRAFFIC_DAYS {
        let at = start + Duration::days(day);
        let (page_url, page_title) = PAGES[(day as usize) % PAGES.len()];
        let desktop = day % 2 == 0;

        let view = NewPageView {
            page_url: text(page_url),
            page_title: text(page_title),
            referrer: text(if day % 3 == 0 { "https://google.com" } else { "direct" }),
            user_agent: text("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"),
            ip_address: Some(format!("192.168.1.{}", (day * 3) % 255)),
            device_type: text(if desktop { "desktop" } else { "mobile" }),
            browser: text("Chrome"),
            os: text(if desktop { "Windows" } else { "iOS" }),
            country: text("US"),
            city: text("New York"),
            duration: Some(120 + day * 5),
            ..Default::default()
        };
        for _ in 0..(50 + day * 2) {
            analytics::record_page_view(&mut *conn, &view, at).await?;
        }

        let events = [
            ("click", "cta-button", 5 + day % 4),
            ("scroll", "main", 3),
            ("download", "resume-link", i64::from(day % 5 == 0)),
        ];
        for (event_type, element_id, times) in events {
            let interaction = NewInteraction {
                event_type: text(event_type),
                element_id: text(element_id),
                page_url: text(page_url),
                ip_address: view.ip_address.clone(),
                extra_data: Some(serde_json::json!({ "day": day })),
                ..Default::default()
            };
            for _ in 0..times {
                analytics::record_interaction(&mut *conn, &interaction, at).await?;
            }
        }
    }
    Ok(())
}

//! Builds the three MERN eCommerce architecture diagrams in one run.
//!
//! ```sh
//! cargo run -p astrolabe --example mern
//! ```
//!
//! Artifacts are written to `./diagrams`.

use astrolabe::{
    AstrolabeError, BuildRun, DiagramConfig, EdgeAttrs, Renderer,
    attributes::Direction,
    color::Color,
    config::AppConfig,
};

fn base_config(title: &str, direction: Direction) -> Result<DiagramConfig, AstrolabeError> {
    let white = Color::new("white").map_err(AstrolabeError::Config)?;
    Ok(DiagramConfig::new(title)
        .with_direction(direction)
        .with_font_size(16)
        .with_background_color(white)
        .with_graph_attr("pad", "0.5"))
}

fn labeled(label: &str) -> EdgeAttrs {
    EdgeAttrs::directed().with_label(label)
}

fn kubernetes(run: BuildRun) -> Result<BuildRun, AstrolabeError> {
    let config = base_config("MERN eCommerce Kubernetes Architecture", Direction::TopToBottom)?;
    Ok(run.diagram(config, |scope| {
        let users = scope.node("End Users", "users")?;

        let (razorpay, brevo) = scope.cluster("External Services", |scope| {
            Ok((
                scope.node("Razorpay\nPayment", "auth0")?,
                scope.node("Brevo\nSMTP Email", "slack")?,
            ))
        })?;

        scope.cluster("AWS Cloud", |scope| {
            let loadbalancer = scope.node("Load Balancer", "elb")?;

            scope.cluster("EKS Cluster", |scope| {
                let ingress = scope.node("Ingress\nController", "ingress")?;

                let (frontend_svc, frontend_deploy, frontend_pods) =
                    scope.cluster("Frontend", |scope| {
                        let svc = scope.node("Frontend\nService", "service")?;
                        let deploy = scope.node("Frontend\nDeployment\n(3 replicas)", "deployment")?;
                        let pods = (0..3)
                            .map(|_| scope.node("Nginx +\nReact App", "pod"))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok((svc, deploy, pods))
                    })?;

                let (backend_svc, backend_deploy, backend_pods) =
                    scope.cluster("Backend", |scope| {
                        let svc = scope.node("Backend\nService", "service")?;
                        let deploy = scope.node("Backend\nDeployment\n(3 replicas)", "deployment")?;
                        let pods = (0..3)
                            .map(|_| scope.node("Express\nAPI", "pod"))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok((svc, deploy, pods))
                    })?;

                let (mongo_svc, mongo_stateful, mongo_pod, pvc, pv, ebs) =
                    scope.cluster("Database", |scope| {
                        let svc = scope.node("MongoDB\nService", "service")?;
                        let stateful = scope.node("MongoDB\nStatefulSet", "statefulset")?;
                        let pod = scope.node("MongoDB", "pod")?;
                        let (pvc, pv, ebs) = scope.cluster("Storage", |scope| {
                            Ok((
                                scope.node("PVC\n10Gi", "pvc")?,
                                scope.node("Persistent\nVolume", "pv")?,
                                scope.node("AWS EBS", "ebs")?,
                            ))
                        })?;
                        Ok((svc, stateful, pod, pvc, pv, ebs))
                    })?;

                // User flow
                scope.edge(users, loadbalancer, labeled("HTTPS"))?;
                scope.link(loadbalancer, ingress)?;

                // Frontend flow
                scope.edge(ingress, frontend_svc, labeled("Port 80"))?;
                scope.link(frontend_svc, frontend_deploy)?;
                scope.link(frontend_deploy, &frontend_pods)?;

                // Backend flow
                scope.edge(&frontend_pods, backend_svc, labeled("API Calls"))?;
                scope.link(backend_svc, backend_deploy)?;
                scope.link(backend_deploy, &backend_pods)?;

                // Database flow
                scope.edge(&backend_pods, mongo_svc, labeled("Port 5000"))?;
                scope.link(mongo_svc, mongo_stateful)?;
                scope.link(mongo_stateful, mongo_pod)?;

                // Storage
                scope.link(mongo_pod, pvc)?;
                scope.link(pvc, pv)?;
                scope.link(pv, ebs)?;

                // External services
                scope.edge(&backend_pods, razorpay, labeled("Payment\nProcessing"))?;
                scope.edge(&backend_pods, brevo, labeled("Order\nEmails"))?;
                Ok(())
            })
        })
    }))
}

fn components(run: BuildRun) -> Result<BuildRun, AstrolabeError> {
    let config = base_config("MERN eCommerce - Component Architecture", Direction::LeftToRight)?
        .with_output_path_override("mern_components");
    Ok(run.diagram(config, |scope| {
        let (browser, react_app, redux) = scope.cluster("Client Layer", |scope| {
            Ok((
                scope.node("Web Browser", "users")?,
                scope.node("React App", "react")?,
                scope.node("Redux Store", "server")?,
            ))
        })?;

        let (nginx, assets) = scope.cluster("Kubernetes - Frontend Tier", |scope| {
            Ok((
                scope.node("Nginx Server", "server")?,
                scope.node("Static Assets", "server")?,
            ))
        })?;

        let ((auth, products, orders), (jwt, _error_handler)) =
            scope.cluster("Kubernetes - Backend Tier", |scope| {
                let controllers = scope.cluster("Express API", |scope| {
                    Ok((
                        scope.node("Auth\nController", "nodejs")?,
                        scope.node("Product\nController", "nodejs")?,
                        scope.node("Order\nController", "nodejs")?,
                    ))
                })?;
                let middleware = scope.cluster("Middleware", |scope| {
                    Ok((
                        scope.node("JWT Auth", "server")?,
                        scope.node("Error Handler", "server")?,
                    ))
                })?;
                Ok((controllers, middleware))
            })?;

        let (mongodb, collections) = scope.cluster("Data Layer", |scope| {
            let mongodb = scope.node("MongoDB", "mongodb")?;
            let collections = scope.cluster("Collections", |scope| {
                Ok([
                    scope.node("Users", "server")?,
                    scope.node("Products", "server")?,
                    scope.node("Orders", "server")?,
                ])
            })?;
            Ok((mongodb, collections))
        })?;
        let [users_col, products_col, orders_col] = collections;

        let (payment, email) = scope.cluster("External APIs", |scope| {
            Ok((
                scope.node("Razorpay API", "auth0")?,
                scope.node("Brevo SMTP", "slack")?,
            ))
        })?;

        scope.link(browser, react_app)?;
        scope.link(react_app, redux)?;
        scope.edge(redux, nginx, labeled("HTTP/REST"))?;
        scope.link(nginx, assets)?;
        scope.edge(nginx, auth, labeled("API Proxy"))?;

        scope.link(auth, jwt)?;
        scope.link(jwt, products)?;
        scope.link(jwt, orders)?;

        scope.link(auth, users_col)?;
        scope.link(products, products_col)?;
        scope.link(orders, orders_col)?;

        scope.link(collections, mongodb)?;

        scope.edge(orders, payment, labeled("Process Payment"))?;
        scope.edge(orders, email, labeled("Send Email"))?;
        Ok(())
    }))
}

fn pipeline(run: BuildRun) -> Result<BuildRun, AstrolabeError> {
    let config = base_config("MERN eCommerce - CI/CD Pipeline", Direction::LeftToRight)?
        .with_output_path_override("mern_cicd");
    Ok(run.diagram(config, |scope| {
        let dev = scope.node("Developer", "users")?;
        let github = scope.node("GitHub\nRepository", "github")?;
        let actions = scope.node("GitHub Actions", "github_actions")?;

        let (docker_build, backend_img, frontend_img) = scope.cluster("Build Stage", |scope| {
            Ok((
                scope.node("Docker Build", "docker")?,
                scope.node("Backend Image", "docker")?,
                scope.node("Frontend Image", "docker")?,
            ))
        })?;

        let ecr = scope.node("AWS ECR\nRegistry", "ecr")?;

        let (kubectl, eks) = scope.cluster("Deploy Stage", |scope| {
            Ok((
                scope.node("kubectl", "server")?,
                scope.node("AWS EKS\nCluster", "eks")?,
            ))
        })?;

        let (deployments, pods) = scope.cluster("Kubernetes Resources", |scope| {
            Ok((
                scope.node("Update\nDeployments", "deployment")?,
                scope.node("Rolling\nUpdate Pods", "pod")?,
            ))
        })?;

        scope.edge(dev, github, labeled("git push"))?;
        scope.edge(github, actions, labeled("trigger"))?;

        scope.link(actions, docker_build)?;
        scope.link(docker_build, backend_img)?;
        scope.link(docker_build, frontend_img)?;

        scope.edge([backend_img, frontend_img], ecr, labeled("push"))?;

        scope.edge(ecr, kubectl, labeled("deploy"))?;
        scope.link(kubectl, eks)?;
        scope.link(eks, deployments)?;
        scope.edge(deployments, pods, labeled("rollout"))?;
        Ok(())
    }))
}

fn main() -> Result<(), AstrolabeError> {
    env_logger::init();

    let renderer = Renderer::from_config(&AppConfig::default().with_output_dir("diagrams"))?;

    let run = pipeline(components(kubernetes(BuildRun::new())?)?)?;
    let artifacts = run.execute(&renderer)?.into_result()?;

    for artifact in artifacts {
        println!("{}", artifact.path().display());
    }
    Ok(())
}
